//! Governance configuration
//!
//! Built once by the host at plugin initialization, validated there, and
//! shared by reference with every component. Never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// MeshGuard governance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshGuardConfig {
    /// Master enablement flag
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key presented to the gateway
    #[serde(default)]
    pub api_key: String,

    /// Identity of the governed agent
    #[serde(default)]
    pub agent_id: String,

    /// Gateway base URL
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Enforcement mode
    #[serde(default)]
    pub mode: GovernanceMode,

    /// How much detail audit events carry
    #[serde(default)]
    pub audit_level: AuditVerbosity,

    /// How long a cached policy decision stays valid
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Allow actions when the gateway cannot be reached
    #[serde(default)]
    pub fail_open: bool,

    /// Bound on every gateway call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Queue size that forces an immediate audit flush
    #[serde(default = "default_audit_batch_size")]
    pub audit_batch_size: usize,

    /// Debounced flush delay after the first unflushed audit event
    #[serde(default = "default_audit_flush_interval_ms")]
    pub audit_flush_interval_ms: u64,

    /// Upper bound on cached decisions
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl MeshGuardConfig {
    /// Whether both credentials required to talk to the gateway are present.
    /// Missing credentials disable governance entirely; they are never fatal.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.agent_id.is_empty()
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Per-request gateway timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Audit flush interval as a duration
    pub fn audit_flush_interval(&self) -> Duration {
        Duration::from_millis(self.audit_flush_interval_ms)
    }
}

impl Default for MeshGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            agent_id: String::new(),
            gateway_url: default_gateway_url(),
            mode: GovernanceMode::default(),
            audit_level: AuditVerbosity::default(),
            cache_ttl_ms: default_cache_ttl_ms(),
            fail_open: false,
            request_timeout_ms: default_request_timeout_ms(),
            audit_batch_size: default_audit_batch_size(),
            audit_flush_interval_ms: default_audit_flush_interval_ms(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

/// Governance enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceMode {
    /// Actively block denied actions
    #[default]
    Enforce,
    /// Log denials without blocking
    Audit,
    /// Governance disabled: no evaluation, no audit
    Bypass,
}

/// Audit event verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditVerbosity {
    /// Type tags only
    Minimal,
    /// Truncated payloads
    #[default]
    Standard,
    /// Full payloads up to hard caps
    Verbose,
}

fn default_true() -> bool {
    true
}

fn default_gateway_url() -> String {
    "https://dashboard.meshguard.app".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    60_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_audit_batch_size() -> usize {
    50
}

fn default_audit_flush_interval_ms() -> u64 {
    5_000
}

fn default_cache_max_entries() -> usize {
    1_024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fail_closed_enforce() {
        let config = MeshGuardConfig::default();
        assert!(config.enabled);
        assert!(!config.fail_open);
        assert_eq!(config.mode, GovernanceMode::Enforce);
        assert_eq!(config.audit_level, AuditVerbosity::Standard);
        assert_eq!(config.cache_ttl_ms, 60_000);
        assert_eq!(config.audit_batch_size, 50);
    }

    #[test]
    fn missing_credentials_detected() {
        let mut config = MeshGuardConfig::default();
        assert!(!config.has_credentials());

        config.api_key = "mk_test".to_string();
        assert!(!config.has_credentials());

        config.agent_id = "agent-1".to_string();
        assert!(config.has_credentials());
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: MeshGuardConfig = serde_json::from_str(
            r#"{"apiKey": "mk_live_1", "agentId": "a1", "mode": "audit", "failOpen": true}"#,
        )
        .unwrap();

        assert_eq!(config.api_key, "mk_live_1");
        assert_eq!(config.mode, GovernanceMode::Audit);
        assert!(config.fail_open);
        assert!(config.enabled);
        assert_eq!(config.gateway_url, "https://dashboard.meshguard.app");
    }
}
