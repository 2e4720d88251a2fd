//! Console sink

use super::Sink;
use crate::core::{FieldFlags, LogRecord, Result};
use crate::dump::dump;
use crate::formatters::{format_plain, FormatOptions, LogFormat};
use std::io::{self, Write};

/// Writes records to stdout, or stderr for EMERGENCY through ERROR
///
/// # Example
///
/// ```
/// use sink_logger::sinks::ConsoleSink;
/// use sink_logger::FieldFlags;
///
/// let sink = ConsoleSink::new(FieldFlags::PREFIX | FieldFlags::COLOR)
///     .with_colors(false);
/// ```
pub struct ConsoleSink {
    flags: FieldFlags,
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new(flags: FieldFlags) -> Self {
        Self {
            flags,
            use_colors: true,
        }
    }

    /// Colour is applied only when the COLOR flag is also set
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// The text written for `record`, without the trailing newline
    pub fn render(&self, record: &LogRecord) -> String {
        let wants_dump = self.flags.contains(FieldFlags::DUMP) && !record.context.is_empty();

        if self.flags.contains(FieldFlags::CONSOLE_AS_JSON) {
            if wants_dump {
                return dump(record);
            }
            return match serde_json::to_string_pretty(record) {
                Ok(json) => json,
                Err(e) => {
                    LogFormat::Ndjson.fallback(record, &e.into(), &FormatOptions::new(self.flags))
                }
            };
        }

        let options = FormatOptions::new(self.flags).with_color(self.use_colors);
        let mut output = format_plain(record, &options);
        if wants_dump {
            output.push_str("\nargs: ");
            output.push_str(&dump(&record.context));
        }
        output
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let output = self.render(record);

        // One locked write per record so concurrent workers never interleave
        if record.level.is_severe() {
            let mut err = io::stderr().lock();
            writeln!(err, "{}", output)?;
        } else {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", output)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
