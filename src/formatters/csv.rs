//! Delimited columns with RFC 4180 quoting
//!
//! Column set follows the flags so every row in a file has the same shape:
//! id, time, level (PREFIX), message, function, file, line, context (CONTEXT).

use super::{context_dump, FormatOptions, DEFAULT_CSV_DELIMITER};
use crate::core::error::{LoggerError, Result};
use crate::core::flags::FieldFlags;
use crate::core::record::LogRecord;

pub(super) fn encode(record: &LogRecord, options: &FormatOptions) -> Result<String> {
    let delimiter = options.csv_delimiter;
    if !usable(delimiter) {
        return Err(LoggerError::formatter(
            "csv",
            format!("unusable delimiter {:?}", delimiter),
        ));
    }

    let flags = options.flags;
    let mut columns: Vec<String> = Vec::with_capacity(8);

    if flags.contains(FieldFlags::ID) {
        columns.push(record.id.clone().unwrap_or_default());
    }
    if flags.contains(FieldFlags::TIMESTAMP) {
        columns.push(record.time.clone().unwrap_or_default());
    }
    if flags.contains(FieldFlags::PREFIX) {
        columns.push(record.level.to_str().to_string());
    }
    columns.push(record.message.clone());
    if flags.contains(FieldFlags::FUNCTION) {
        columns.push(record.function.clone().unwrap_or_default());
    }
    if flags.file_style().is_some() {
        columns.push(record.file.clone().unwrap_or_default());
    }
    if flags.contains(FieldFlags::LINE) {
        columns.push(record.line.map(|l| l.to_string()).unwrap_or_default());
    }
    if options.context_enabled(&record.context) {
        columns.push(context_dump(&record.context));
    }

    Ok(join_row(&columns, delimiter))
}

/// Falls back to the default delimiter only when the configured one is unusable
pub(super) fn fallback(message: &str, context: &str, options: &FormatOptions) -> String {
    let delimiter = if usable(options.csv_delimiter) {
        options.csv_delimiter
    } else {
        DEFAULT_CSV_DELIMITER
    };
    join_row(
        &["ERROR".to_string(), message.to_string(), context.to_string()],
        delimiter,
    )
}

fn usable(delimiter: char) -> bool {
    !matches!(delimiter, '"' | '\r' | '\n')
}

fn join_row(columns: &[String], delimiter: char) -> String {
    let mut sep = [0u8; 4];
    let sep = delimiter.encode_utf8(&mut sep);
    columns
        .iter()
        .map(|c| quote(c, delimiter))
        .collect::<Vec<_>>()
        .join(sep)
}

fn quote(field: &str, delimiter: char) -> String {
    let needs_quotes = field.starts_with(' ')
        || field
            .chars()
            .any(|c| c == delimiter || matches!(c, '"' | '\r' | '\n'));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
