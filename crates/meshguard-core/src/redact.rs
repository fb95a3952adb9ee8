//! Sensitive-parameter redaction
//!
//! Runs before any tool parameters are cached, logged, or transmitted.
//! Pure and idempotent: re-redacting an already-redacted map is a no-op.

use crate::types::ContextMap;
use serde_json::Value;

/// Replacement for values under a sensitive key
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Suffix appended to truncated string values
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Longest string value passed through untouched
const MAX_VALUE_CHARS: usize = 500;

/// Key substrings that mark a value as sensitive, lowercase
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "api_key",
    "apikey",
    "credential",
    "authorization",
    "bearer",
];

/// Redact sensitive values and truncate oversized strings.
///
/// A key matching the denylist (case-insensitive substring) has its value
/// replaced with [`REDACTION_MARKER`]. Other string values longer than 500
/// characters are cut at 500 with [`TRUNCATION_MARKER`] appended. Everything
/// else passes through unchanged.
pub fn redact_params(params: &ContextMap) -> ContextMap {
    params
        .iter()
        .map(|(key, value)| {
            let lower = key.to_lowercase();
            let redacted = if SENSITIVE_KEYS.iter().any(|sk| lower.contains(sk)) {
                Value::String(REDACTION_MARKER.to_string())
            } else if let Value::String(s) = value {
                truncate_value(s)
            } else {
                value.clone()
            };
            (key.clone(), redacted)
        })
        .collect()
}

fn truncate_value(s: &str) -> Value {
    // Already-truncated values keep their marker; truncating again would
    // break idempotency.
    if s.ends_with(TRUNCATION_MARKER) || s.chars().count() <= MAX_VALUE_CHARS {
        return Value::String(s.to_string());
    }

    let cut = s
        .char_indices()
        .nth(MAX_VALUE_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Value::String(format!("{}{}", &s[..cut], TRUNCATION_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> ContextMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn redacts_denylisted_keys() {
        let input = params(&[
            ("password", json!("hunter2")),
            ("api_key", json!("mk_live_1")),
            ("path", json!("/etc/passwd")),
        ]);

        let redacted = redact_params(&input);
        assert_eq!(redacted["password"], json!(REDACTION_MARKER));
        assert_eq!(redacted["api_key"], json!(REDACTION_MARKER));
        assert_eq!(redacted["path"], json!("/etc/passwd"));
    }

    #[test]
    fn matches_case_insensitive_substrings() {
        let input = params(&[
            ("apiKey", json!("k")),
            ("MY_SECRET_VALUE", json!("s")),
            ("AuthorizationHeader", json!("Bearer abc")),
            ("bearer_token", json!("t")),
        ]);

        let redacted = redact_params(&input);
        for value in redacted.values() {
            assert_eq!(value, &json!(REDACTION_MARKER));
        }
    }

    #[test]
    fn truncates_long_strings() {
        let long = "x".repeat(501);
        let input = params(&[("body", json!(long))]);

        let redacted = redact_params(&input);
        let out = redacted["body"].as_str().unwrap();
        assert!(out.starts_with(&"x".repeat(500)));
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 500 + TRUNCATION_MARKER.len());
    }

    #[test]
    fn passes_short_strings_and_non_strings_through() {
        let exactly_500 = "y".repeat(500);
        let input = params(&[
            ("text", json!(exactly_500)),
            ("count", json!(42)),
            ("flags", json!(["a", "b"])),
            ("nested", json!({"inner": true})),
            ("none", Value::Null),
        ]);

        assert_eq!(redact_params(&input), input);
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        let long = "é".repeat(600);
        let input = params(&[("body", json!(long))]);

        let redacted = redact_params(&input);
        let out = redacted["body"].as_str().unwrap();
        assert_eq!(out.chars().count(), 500 + TRUNCATION_MARKER.len());
    }

    #[test]
    fn redaction_is_idempotent() {
        let input = params(&[
            ("secret", json!("s3cr3t")),
            ("blob", json!("z".repeat(9_000))),
            ("path", json!("/tmp/ok")),
        ]);

        let once = redact_params(&input);
        let twice = redact_params(&once);
        assert_eq!(once, twice);
    }
}
