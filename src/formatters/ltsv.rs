//! Labeled tab-separated values: `label:value<TAB>label:value`
//!
//! `level` and `message` are always present; the other labels follow the
//! flags and are skipped when the record has no value for them.

use super::{context_dump, flatten, FormatOptions};
use crate::core::flags::FieldFlags;
use crate::core::record::LogRecord;

pub(super) fn encode(record: &LogRecord, options: &FormatOptions) -> String {
    let flags = options.flags;
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(8);

    if flags.contains(FieldFlags::ID) {
        if let Some(id) = &record.id {
            pairs.push(("id", id.clone()));
        }
    }
    if flags.contains(FieldFlags::TIMESTAMP) {
        if let Some(time) = &record.time {
            pairs.push(("time", time.clone()));
        }
    }
    pairs.push(("level", record.level.to_str().to_string()));
    pairs.push(("message", record.message.clone()));
    if flags.contains(FieldFlags::FUNCTION) {
        if let Some(function) = &record.function {
            pairs.push(("function", function.clone()));
        }
    }
    if flags.file_style().is_some() {
        if let Some(file) = &record.file {
            pairs.push(("file", file.clone()));
        }
    }
    if flags.contains(FieldFlags::LINE) {
        if let Some(line) = record.line {
            pairs.push(("line", line.to_string()));
        }
    }
    if options.context_enabled(&record.context) {
        pairs.push(("context", context_dump(&record.context)));
    }

    join(&pairs)
}

pub(super) fn fallback(message: &str, context: &str) -> String {
    join(&[
        ("level", "ERROR".to_string()),
        ("message", message.to_string()),
        ("context", context.to_string()),
    ])
}

fn join(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(label, value)| format!("{}:{}", label, flatten(value)))
        .collect::<Vec<_>>()
        .join("\t")
}

#[cfg(test)]
mod tests {
    use super::super::test_support::full_record;
    use super::*;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_all_labels() {
        let out = encode(&full_record(), &FormatOptions::new(FieldFlags::ALL));
        let labels: Vec<_> = out
            .split('\t')
            .map(|p| p.split_once(':').map(|(l, _)| l).unwrap_or_default())
            .collect();
        assert_eq!(
            labels,
            ["id", "time", "level", "message", "function", "file", "line", "context"]
        );
        assert!(out.starts_with(
            "id:65a1b2c3d4e5f60718293a4b\ttime:2025-01-08 10:30:45.123456\tlevel:WARNING"
        ));
        assert!(!out.ends_with('\t'));
    }

    #[test]
    fn test_level_and_message_always_present() {
        let out = encode(&full_record(), &FormatOptions::new(FieldFlags::empty()));
        assert_eq!(out, "level:WARNING\tmessage:disk almost full");
    }

    #[test]
    fn test_values_are_flattened() {
        let record = LogRecord::new(LogLevel::Info, "two\nlines\tand tab");
        let out = encode(&record, &FormatOptions::new(FieldFlags::ALL));
        assert_eq!(out, "level:INFO\tmessage:two lines and tab");
    }
}
