//! Tool-result summarization for audit events
//!
//! The audit verbosity level controls how much of a tool's result leaves
//! the process: minimal keeps a type tag, standard keeps a truncated
//! preview, verbose keeps the payload up to hard caps.

use meshguard_core::AuditVerbosity;
use serde_json::Value;

/// Suffix marking a truncated standard-level preview
const ELLIPSIS: &str = "...";

/// Standard level: longest string result kept as-is
const STANDARD_STRING_CHARS: usize = 200;

/// Standard level: longest serialized object kept as-is
const STANDARD_OBJECT_CHARS: usize = 500;

/// Verbose level: longest string result kept
const VERBOSE_STRING_CHARS: usize = 10_000;

/// Verbose level: serialized objects beyond this are dropped entirely
const VERBOSE_OBJECT_CHARS: usize = 50_000;

/// Shrink a tool result to what the configured verbosity allows
pub fn summarize_result(result: &Value, level: AuditVerbosity) -> Value {
    match level {
        AuditVerbosity::Minimal => minimal_summary(result),
        AuditVerbosity::Standard => standard_summary(result),
        AuditVerbosity::Verbose => verbose_summary(result),
    }
}

fn minimal_summary(result: &Value) -> Value {
    let tag = match result {
        Value::Object(_) | Value::Array(_) => "[object]",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    };
    Value::String(tag.to_string())
}

fn standard_summary(result: &Value) -> Value {
    match result {
        Value::String(s) => {
            if s.chars().count() > STANDARD_STRING_CHARS {
                Value::String(format!("{}{ELLIPSIS}", truncate(s, STANDARD_STRING_CHARS)))
            } else {
                result.clone()
            }
        }
        Value::Object(_) | Value::Array(_) => {
            let serialized = serialize(result);
            if serialized.chars().count() > STANDARD_OBJECT_CHARS {
                Value::String(format!(
                    "{}{ELLIPSIS}",
                    truncate(&serialized, STANDARD_OBJECT_CHARS)
                ))
            } else {
                result.clone()
            }
        }
        _ => result.clone(),
    }
}

fn verbose_summary(result: &Value) -> Value {
    match result {
        Value::String(s) => {
            if s.chars().count() > VERBOSE_STRING_CHARS {
                Value::String(format!(
                    "{}{}",
                    truncate(s, VERBOSE_STRING_CHARS),
                    meshguard_core::TRUNCATION_MARKER
                ))
            } else {
                result.clone()
            }
        }
        Value::Object(_) | Value::Array(_) => {
            if serialize(result).chars().count() > VERBOSE_OBJECT_CHARS {
                Value::String("[result too large to log]".to_string())
            } else {
                result.clone()
            }
        }
        _ => result.clone(),
    }
}

fn serialize(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
