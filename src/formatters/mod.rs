//! Record encodings for file output
//!
//! Every format turns a record into one line or one document. Encoding may
//! fail (an XML-illegal character, an unusable CSV delimiter); formatting
//! never does. On failure the format emits its own synthetic ERROR record
//! carrying the error text and a flattened dump of the original record.

mod csv;
mod json;
mod ltsv;
mod plain;
mod xml;
mod yaml;

use crate::core::error::{LoggerError, Result};
use crate::core::fields::Fields;
use crate::core::flags::FieldFlags;
use crate::core::record::LogRecord;
use crate::dump::dump;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use plain::format_plain;

/// Default CSV delimiter
pub const DEFAULT_CSV_DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Ndjson,
    Csv,
    Plain,
    /// Single-line `<log>` document
    Xml,
    /// `---` document per record
    Yaml,
    /// Labeled tab-separated values
    Ltsv,
}

/// Flag-dependent knobs shared by all formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub flags: FieldFlags,
    pub csv_delimiter: char,
    /// Emit colour escapes when the COLOR flag is also set
    pub color: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            flags: FieldFlags::ALL,
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            color: false,
        }
    }
}

impl FormatOptions {
    pub fn new(flags: FieldFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn context_enabled(&self, context: &Fields) -> bool {
        self.flags.contains(FieldFlags::CONTEXT) && !context.is_empty()
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Ndjson => "ndjson",
            LogFormat::Csv => "csv",
            LogFormat::Plain => "plain",
            LogFormat::Xml => "xml",
            LogFormat::Yaml => "yaml",
            LogFormat::Ltsv => "ltsv",
        }
    }

    /// Encode `record`, reporting any failure
    pub fn encode(&self, record: &LogRecord, options: &FormatOptions) -> Result<String> {
        match self {
            LogFormat::Ndjson => json::encode(record),
            LogFormat::Csv => csv::encode(record, options),
            LogFormat::Plain => Ok(plain::format_plain(record, options)),
            LogFormat::Xml => xml::encode(record),
            LogFormat::Yaml => Ok(yaml::encode(record)),
            LogFormat::Ltsv => Ok(ltsv::encode(record, options)),
        }
    }

    /// Synthetic ERROR record describing why `record` could not be encoded
    pub fn fallback(
        &self,
        record: &LogRecord,
        error: &LoggerError,
        options: &FormatOptions,
    ) -> String {
        let message = serialization_error(error);
        let context = flatten(&dump(record));
        match self {
            LogFormat::Ndjson => json::fallback(&message, &context),
            LogFormat::Csv => csv::fallback(&message, &context, options),
            LogFormat::Plain => format!("[ERROR] {} {}", message, context),
            LogFormat::Xml => xml::fallback(&message, &context),
            LogFormat::Yaml => yaml::fallback(&message, &context),
            LogFormat::Ltsv => ltsv::fallback(&message, &context),
        }
    }

    /// Encode `record`, substituting the fallback on failure
    pub fn format(&self, record: &LogRecord, options: &FormatOptions) -> String {
        match self.encode(record, options) {
            Ok(output) => output,
            Err(e) => self.fallback(record, &e, options),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ndjson" | "json" | "0" => Ok(LogFormat::Ndjson),
            "csv" | "1" => Ok(LogFormat::Csv),
            "plain" | "text" | "2" => Ok(LogFormat::Plain),
            "xml" | "3" => Ok(LogFormat::Xml),
            "yaml" | "yml" | "4" => Ok(LogFormat::Yaml),
            "ltsv" | "5" => Ok(LogFormat::Ltsv),
            _ => Err(format!("Invalid file format: '{}'", s)),
        }
    }
}

fn serialization_error(error: &LoggerError) -> String {
    format!("Log serialization error: {}", error)
}

/// Replace tabs, carriage returns and newlines with single spaces
pub(crate) fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

/// Flattened dump of the context, used by the column formats
fn context_dump(context: &Fields) -> String {
    flatten(&dump(context))
}
