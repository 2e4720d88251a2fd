//! NDJSON: one compact JSON object per record

use crate::core::error::Result;
use crate::core::record::LogRecord;

pub(super) fn encode(record: &LogRecord) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

pub(super) fn fallback(message: &str, context: &str) -> String {
    serde_json::json!({
        "level": "ERROR",
        "message": message,
        "context": context,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::full_record;
    use super::*;
    use crate::core::log_level::LogLevel;

    #[test]
    fn test_single_line_with_populated_fields() {
        let out = encode(&full_record()).unwrap();
        assert!(!out.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["level"], "WARNING");
        assert_eq!(value["line"], 42);
        assert_eq!(value["context"]["pct"], 91);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let out = encode(&LogRecord::new(LogLevel::Info, "hi")).unwrap();
        assert_eq!(out, r#"{"level":"INFO","message":"hi"}"#);
    }

    #[test]
    fn test_decodes_back_to_equal_record() {
        let record = full_record();
        let back: LogRecord = serde_json::from_str(&encode(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_fallback_is_valid_json() {
        let out = fallback("Log serialization error: boom", "struct(LogRecord){ \"q\" }");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["context"], "struct(LogRecord){ \"q\" }");
    }
}
