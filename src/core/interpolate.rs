//! Placeholder substitution for message templates
//!
//! `{key}` and `:key` are replaced by the `Display` form of the matching
//! context value. The template is scanned once, left to right, and inserted
//! text is never rescanned, so a value that itself contains `{other}` or
//! `:other` is emitted verbatim.

use super::fields::{FieldValue, Fields};
use std::collections::HashMap;

/// Substitute context values into `template`.
///
/// - The last value for a duplicated key wins.
/// - `:key` matches the longest key present at that position, so `:id`
///   never clobbers `:identifier`.
/// - Empty keys and placeholders with no matching key are left untouched.
///
/// # Example
///
/// ```
/// use sink_logger::{interpolate, Fields};
///
/// let ctx = Fields::new().with("user", "ana").with("id", 42);
/// assert_eq!(interpolate("user {user} (:id)", &ctx), "user ana (42)");
/// assert_eq!(interpolate("{missing}", &ctx), "{missing}");
/// ```
pub fn interpolate(template: &str, context: &Fields) -> String {
    if context.is_empty() || !template.contains(['{', ':']) {
        return template.to_string();
    }

    let mut lookup: HashMap<&str, &FieldValue> = HashMap::with_capacity(context.len());
    for f in context.iter().filter(|f| !f.key.is_empty()) {
        lookup.insert(f.key.as_str(), &f.value);
    }
    if lookup.is_empty() {
        return template.to_string();
    }

    // Keys longest first for `:key` matching
    let mut by_length: Vec<&str> = lookup.keys().copied().collect();
    by_length.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', ':']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let matched = if tail.starts_with('{') {
            tail[1..].find('}').and_then(|end| {
                let key = &tail[1..1 + end];
                lookup.get(key).map(|v| (v, end + 2))
            })
        } else {
            let after = &tail[1..];
            by_length
                .iter()
                .find(|key| after.starts_with(**key))
                .and_then(|key| lookup.get(key).map(|v| (v, key.len() + 1)))
        };

        match matched {
            Some((value, consumed)) => {
                out.push_str(&value.to_string());
                rest = &tail[consumed..];
            }
            None => {
                // Both '{' and ':' are one byte
                out.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> Fields {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_both_placeholder_styles() {
        let c = ctx(&[("name", "ana"), ("n", "3")]);
        assert_eq!(interpolate("hi {name}, you have :n new", &c), "hi ana, you have 3 new");
    }

    #[test]
    fn test_unmatched_placeholders_are_kept() {
        let c = ctx(&[("a", "1")]);
        assert_eq!(interpolate("{b} :b {a", &c), "{b} :b {a");
        assert_eq!(interpolate("time 10:30", &c), "time 10:30");
    }

    #[test]
    fn test_last_duplicate_wins() {
        let c = ctx(&[("k", "first"), ("k", "second")]);
        assert_eq!(interpolate("{k}/:k", &c), "second/second");
    }

    #[test]
    fn test_longest_colon_key_wins() {
        let c = ctx(&[("id", "SHORT"), ("identifier", "LONG")]);
        assert_eq!(interpolate(":identifier :id", &c), "LONG SHORT");
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let c = ctx(&[("a", "{b}"), ("b", ":a")]);
        assert_eq!(interpolate("{a} {b}", &c), "{b} :a");
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let c = ctx(&[("", "boom")]);
        assert_eq!(interpolate("{} : {}", &c), "{} : {}");
    }

    #[test]
    fn test_non_string_values() {
        let c = Fields::new().with("n", 5).with("ok", false).with("tags", vec!["a", "b"]);
        assert_eq!(interpolate("{n} {ok} {tags}", &c), r#"5 false ["a","b"]"#);
    }

    #[test]
    fn test_multibyte_text() {
        let c = ctx(&[("who", "José")]);
        assert_eq!(interpolate("¡hola {who}! ñ:who", &c), "¡hola José! ñJosé");
    }
}
