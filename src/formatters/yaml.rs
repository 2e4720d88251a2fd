//! One YAML document per record
//!
//! Strings are always double-quoted so no value can be mistaken for another
//! YAML type.

use super::flatten;
use crate::core::fields::FieldValue;
use crate::core::record::LogRecord;
use std::fmt::Write;

pub(super) fn encode(record: &LogRecord) -> String {
    let mut out = String::from("---");

    if let Some(id) = &record.id {
        scalar_line(&mut out, "id", id);
    }
    if let Some(time) = &record.time {
        scalar_line(&mut out, "time", time);
    }
    scalar_line(&mut out, "level", record.level.to_str());
    scalar_line(&mut out, "message", &record.message);
    if let Some(function) = &record.function {
        scalar_line(&mut out, "function", function);
    }
    if let Some(file) = &record.file {
        scalar_line(&mut out, "file", file);
    }
    if let Some(line) = record.line {
        let _ = write!(out, "\nline: {}", line);
    }

    if !record.context.is_empty() {
        out.push_str("\ncontext:");
        for field in &record.context {
            write_entry(&mut out, 1, &quote(&field.key), &field.value);
        }
    }
    out
}

pub(super) fn fallback(message: &str, context: &str) -> String {
    format!(
        "---\nlevel: \"ERROR\"\nmessage: {}\ncontext: {}",
        quote(message),
        quote(context)
    )
}

fn scalar_line(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, "\n{}: {}", key, quote(value));
}

fn indent(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// `key: value` at `depth`, with composite values as nested blocks
fn write_entry(out: &mut String, depth: usize, key: &str, value: &FieldValue) {
    indent(out, depth);
    let _ = write!(out, "{}:", key);
    match value {
        FieldValue::List(items) if !items.is_empty() => {
            for item in items {
                write_item(out, depth + 1, item);
            }
        }
        FieldValue::Map(pairs) if !pairs.is_empty() => {
            for (k, v) in pairs {
                write_entry(out, depth + 1, &quote(k), v);
            }
        }
        other => {
            out.push(' ');
            out.push_str(&inline(other));
        }
    }
}

fn write_item(out: &mut String, depth: usize, value: &FieldValue) {
    indent(out, depth);
    out.push('-');
    match value {
        FieldValue::List(items) if !items.is_empty() => {
            for item in items {
                write_item(out, depth + 1, item);
            }
        }
        FieldValue::Map(pairs) if !pairs.is_empty() => {
            for (k, v) in pairs {
                write_entry(out, depth + 1, &quote(k), v);
            }
        }
        other => {
            out.push(' ');
            out.push_str(&inline(other));
        }
    }
}

fn inline(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::UInt(u) => u.to_string(),
        FieldValue::Float(f) if f.is_nan() => ".nan".to_string(),
        FieldValue::Float(f) if f.is_infinite() => {
            let inf = if f.is_sign_positive() { ".inf" } else { "-.inf" };
            inf.to_string()
        }
        FieldValue::Float(f) => f.to_string(),
        FieldValue::String(s) => quote(s),
        FieldValue::List(_) => "[]".to_string(),
        FieldValue::Map(_) => "{}".to_string(),
    }
}

/// Double-quoted scalar with tabs and newlines flattened
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in flatten(s).chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::full_record;
    use super::*;
    use crate::core::fields::Fields;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_full_document() {
        assert_eq!(
            encode(&full_record()),
            "---\n\
             id: \"65a1b2c3d4e5f60718293a4b\"\n\
             time: \"2025-01-08 10:30:45.123456\"\n\
             level: \"WARNING\"\n\
             message: \"disk almost full\"\n\
             function: \"app::storage::check\"\n\
             file: \"storage.rs\"\n\
             line: 42\n\
             context:\n  \
             \"disk\": \"/dev/sda1\"\n  \
             \"pct\": 91"
        );
    }

    #[test]
    fn test_quoting() {
        let record = LogRecord::new(LogLevel::Info, "say \"hi\"\tC:\\tmp\u{7}");
        assert!(encode(&record).contains("message: \"say \\\"hi\\\" C:\\\\tmp\\u0007\""));
    }

    #[test]
    fn test_nested_context() {
        let context = Fields::new()
            .with("tags", vec!["a", "b"])
            .with("empty", Vec::<String>::new())
            .with("user", serde_json::json!({"id": 1}));
        let out = encode(&LogRecord::new(LogLevel::Info, "m").with_context(context));
        assert!(out.ends_with(
            "context:\n  \"tags\":\n    - \"a\"\n    - \"b\"\n  \"empty\": []\n  \"user\":\n    \"id\": 1"
        ));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(
            fallback("Log serialization error: x", "a \"b\""),
            "---\nlevel: \"ERROR\"\nmessage: \"Log serialization error: x\"\ncontext: \"a \\\"b\\\"\""
        );
    }
}
