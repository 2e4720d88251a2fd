//! Single-line `<log>` document per record

use super::flatten;
use crate::core::error::{LoggerError, Result};
use crate::core::fields::FieldValue;
use crate::core::record::LogRecord;
use std::fmt::Write;

pub(super) fn encode(record: &LogRecord) -> Result<String> {
    let mut out = String::with_capacity(record.message.len() + 128);
    out.push_str("<log>");

    if let Some(id) = &record.id {
        element(&mut out, "id", id)?;
    }
    if let Some(time) = &record.time {
        element(&mut out, "time", time)?;
    }
    element(&mut out, "level", record.level.to_str())?;
    element(&mut out, "message", &record.message)?;
    if let Some(function) = &record.function {
        element(&mut out, "function", function)?;
    }
    if let Some(file) = &record.file {
        element(&mut out, "file", file)?;
    }
    if let Some(line) = record.line {
        let _ = write!(out, "<line>{}</line>", line);
    }

    if !record.context.is_empty() {
        out.push_str("<context>");
        for field in &record.context {
            write_field(&mut out, &field.key, &field.value)?;
        }
        out.push_str("</context>");
    }

    out.push_str("</log>");
    Ok(out)
}

pub(super) fn fallback(message: &str, context: &str) -> String {
    format!(
        "<log><level>ERROR</level><message>{}</message><context>{}</context></log>",
        escape_lossy(message),
        escape_lossy(context)
    )
}

fn element(out: &mut String, name: &str, text: &str) -> Result<()> {
    let _ = write!(out, "<{0}>{1}</{0}>", name, escape(text)?);
    Ok(())
}

fn write_field(out: &mut String, key: &str, value: &FieldValue) -> Result<()> {
    let _ = write!(out, "<field key=\"{}\">", escape(key)?);
    write_value(out, value)?;
    out.push_str("</field>");
    Ok(())
}

fn write_value(out: &mut String, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Null => {}
        FieldValue::String(s) => out.push_str(&escape(s)?),
        FieldValue::List(items) => {
            for item in items {
                out.push_str("<item>");
                write_value(out, item)?;
                out.push_str("</item>");
            }
        }
        FieldValue::Map(pairs) => {
            for (key, value) in pairs {
                write_field(out, key, value)?;
            }
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
    Ok(())
}

/// Characters outside the XML 1.0 `Char` production
fn is_illegal(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        c if c < '\u{20}' => true,
        '\u{FFFE}' | '\u{FFFF}' => true,
        _ => false,
    }
}

fn escape(text: &str) -> Result<String> {
    if let Some(bad) = text.chars().find(|c| is_illegal(*c)) {
        return Err(LoggerError::formatter(
            "xml",
            format!("illegal character U+{:04X} in text", bad as u32),
        ));
    }
    Ok(escape_legal(text))
}

fn escape_lossy(text: &str) -> String {
    let legal: String = text.chars().filter(|c| !is_illegal(*c)).collect();
    escape_legal(&legal)
}

fn escape_legal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in flatten(text).chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
