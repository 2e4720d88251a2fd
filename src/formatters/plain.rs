//! Human-readable single line
//!
//! `[ID:<id>] <time> [<LEVEL>] <message> [<function>] (<file>:<line>) | k=v`

use super::FormatOptions;
use crate::core::flags::FieldFlags;
use crate::core::record::LogRecord;
use colored::Colorize;
use std::fmt::Write;

/// Render `record` as plain text. Colour escapes wrap the id, the level
/// prefix and the message when both `options.color` and the COLOR flag are
/// set.
pub fn format_plain(record: &LogRecord, options: &FormatOptions) -> String {
    let flags = options.flags;
    let colored = options.color && flags.contains(FieldFlags::COLOR);
    let paint = |text: &str| -> String {
        if colored {
            text.color(record.level.color_code()).to_string()
        } else {
            text.to_string()
        }
    };

    let mut out = String::with_capacity(record.message.len() + 64);

    if flags.contains(FieldFlags::ID) {
        if let Some(id) = &record.id {
            let _ = write!(out, "[ID:{}] ", paint(id));
        }
    }
    if flags.contains(FieldFlags::TIMESTAMP) {
        if let Some(time) = &record.time {
            let _ = write!(out, "{} ", time);
        }
    }
    if flags.contains(FieldFlags::PREFIX) {
        let _ = write!(out, "[{}] ", paint(record.level.to_str()));
    }

    out.push_str(&paint(&record.message));

    if flags.contains(FieldFlags::FUNCTION) {
        if let Some(function) = &record.function {
            let _ = write!(out, " [{}]", function);
        }
    }
    if flags.wants_location() {
        if let Some(location) = record.location() {
            let _ = write!(out, " ({})", location);
        }
    }
    if options.context_enabled(&record.context) {
        let _ = write!(out, " | {}", record.context.format_pairs());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::test_support::full_record;
    use super::*;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_full_line_in_fixed_order() {
        let out = format_plain(&full_record(), &FormatOptions::new(FieldFlags::ALL));
        assert_eq!(
            out,
            "[ID:65a1b2c3d4e5f60718293a4b] 2025-01-08 10:30:45.123456 [WARNING] disk almost full \
             [app::storage::check] (storage.rs:42) | disk=/dev/sda1 pct=91"
        );
    }

    #[test]
    fn test_parts_are_gated_by_flags() {
        let flags = FieldFlags::TIMESTAMP | FieldFlags::PREFIX;
        let out = format_plain(&full_record(), &FormatOptions::new(flags));
        assert_eq!(out, "2025-01-08 10:30:45.123456 [WARNING] disk almost full");

        let out = format_plain(&full_record(), &FormatOptions::new(FieldFlags::empty()));
        assert_eq!(out, "disk almost full");
    }

    /// Remove SGR escape sequences (`ESC [ ... m`)
    fn strip_ansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_color_requires_flag_and_option() {
        let record = LogRecord::new(LogLevel::Error, "bad");

        // Whether escapes appear also depends on the terminal and
        // NO_COLOR / CLICOLOR; the text underneath never changes
        let flags = FieldFlags::PREFIX | FieldFlags::COLOR;
        let out = format_plain(&record, &FormatOptions::new(flags).with_color(true));
        assert_eq!(strip_ansi(&out), "[ERROR] bad");
        if out.contains('\u{1b}') {
            assert!(out.contains("\u{1b}[31mERROR"));
        }

        let out = format_plain(&record, &FormatOptions::new(flags));
        assert_eq!(out, "[ERROR] bad");

        let out = format_plain(&record, &FormatOptions::new(FieldFlags::PREFIX).with_color(true));
        assert_eq!(out, "[ERROR] bad");
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("[\u{1b}[31mERROR\u{1b}[0m] x"), "[ERROR] x");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
