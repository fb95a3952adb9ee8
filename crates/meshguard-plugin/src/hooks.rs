//! Host hook payloads
//!
//! The shapes exchanged with the host runtime's hook mechanism: tool-call
//! events, the per-invocation context, and the block directive a handler
//! may return.

use meshguard_core::ContextMap;
use serde::{Deserialize, Serialize};

/// Event delivered before a tool runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeToolEvent {
    /// Name of the tool about to execute
    pub tool_name: String,

    /// Raw tool parameters; redacted before leaving the process
    #[serde(default)]
    pub params: ContextMap,
}

impl BeforeToolEvent {
    /// Create an event for a tool with parameters
    pub fn new(tool_name: impl Into<String>, params: ContextMap) -> Self {
        Self {
            tool_name: tool_name.into(),
            params,
        }
    }
}

/// Event delivered after a tool ran
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterToolEvent {
    /// Name of the tool that executed
    pub tool_name: String,

    /// Raw tool parameters
    #[serde(default)]
    pub params: ContextMap,

    /// Tool result, when it produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error text, when the tool failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Tool execution time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl AfterToolEvent {
    /// Create an event for a completed tool
    pub fn new(tool_name: impl Into<String>, params: ContextMap) -> Self {
        Self {
            tool_name: tool_name.into(),
            params,
            result: None,
            error: None,
            duration_ms: None,
        }
    }

    /// Attach the tool result
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Attach error text
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach the execution time
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Per-invocation context supplied by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    /// Session the invocation belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,

    /// Agent identity as the host sees it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl HookContext {
    /// Context carrying a session key
    pub fn with_session_key(session_key: impl Into<String>) -> Self {
        Self {
            session_key: Some(session_key.into()),
            agent_id: None,
        }
    }
}

/// Directive returned to the host to stop a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDirective {
    /// Always true; present for the host's wire shape
    pub block: bool,

    /// Human-readable reason shown to the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl BlockDirective {
    /// A blocking directive with the given reason
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            block: true,
            block_reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_directive_serializes_camel_case() {
        let directive = BlockDirective::with_reason("MeshGuard: denied");
        let value = serde_json::to_value(&directive).unwrap();

        assert_eq!(value["block"], true);
        assert_eq!(value["blockReason"], "MeshGuard: denied");
    }

    #[test]
    fn before_event_accepts_missing_params() {
        let event: BeforeToolEvent =
            serde_json::from_str(r#"{"toolName": "read_file"}"#).unwrap();
        assert_eq!(event.tool_name, "read_file");
        assert!(event.params.is_empty());
    }
}
