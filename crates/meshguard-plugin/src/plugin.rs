//! Plugin entry point
//!
//! Builds the component graph once at initialization and exposes the three
//! handlers the host runtime wires into its tool lifecycle hooks.

use crate::gate::DecisionGate;
use crate::hooks::{AfterToolEvent, BeforeToolEvent, BlockDirective, HookContext};
use meshguard_audit::AuditSink;
use meshguard_core::{Gateway, MeshGuardConfig};
use meshguard_gateway::HttpGateway;
use meshguard_policy::PolicyClient;
use std::sync::Arc;
use tracing::{info, warn};

/// The MeshGuard governance interceptor.
///
/// One instance per host process. The policy cache and audit queue live
/// inside and are shared by every concurrent invocation.
pub struct MeshGuard {
    gate: DecisionGate,
    audit: AuditSink,
    enabled: bool,
}

impl MeshGuard {
    /// Build the interceptor against the configured HTTPS gateway
    pub fn new(config: MeshGuardConfig) -> anyhow::Result<Self> {
        let gateway = Arc::new(HttpGateway::new(&config)?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build the interceptor over an explicit gateway implementation.
    /// This is the seam tests and embedders use.
    pub fn with_gateway(config: MeshGuardConfig, gateway: Arc<dyn Gateway>) -> Self {
        let enabled = config.enabled && config.has_credentials();
        if config.enabled && !config.has_credentials() {
            warn!("missing API key or agent id, governance disabled");
        }
        if enabled {
            info!(
                agent_id = %config.agent_id,
                mode = ?config.mode,
                "initializing governance"
            );
        }

        let config = Arc::new(config);
        let policy = PolicyClient::new(config.clone(), gateway.clone());
        let audit = AuditSink::new(config.clone(), gateway);
        let gate = DecisionGate::new(config, policy, audit.clone());

        Self {
            gate,
            audit,
            enabled,
        }
    }

    /// Whether governance is active for this process
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Before-call handler. The host must await the returned directive
    /// before executing the tool body.
    pub async fn before_tool_call(
        &self,
        event: &BeforeToolEvent,
        ctx: Option<&HookContext>,
    ) -> Option<BlockDirective> {
        if !self.enabled {
            return None;
        }
        self.gate.before_tool_call(event, ctx).await
    }

    /// After-call handler. Fire-and-forget audit of the tool outcome.
    pub async fn after_tool_call(&self, event: &AfterToolEvent, ctx: &HookContext) {
        if !self.enabled {
            return;
        }
        self.gate.after_tool_call(event, ctx).await;
    }

    /// Force out any batched audit events
    pub async fn flush_audit(&self) {
        if !self.enabled {
            return;
        }
        self.audit.flush().await;
    }

    /// Shutdown handler: drain the audit sink before process exit
    pub async fn shutdown(&self) {
        if !self.enabled {
            return;
        }
        info!("flushing audit queue before shutdown");
        self.audit.shutdown().await;
    }
}
