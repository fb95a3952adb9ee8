//! Decision gate
//!
//! Orchestrates one tool invocation: redact the parameters, evaluate the
//! policy, emit the audit record, and return the enforcement directive.
//! The host awaits the before-call path to completion before the tool body
//! runs; the after-call path is audit only.

use crate::hooks::{AfterToolEvent, BeforeToolEvent, BlockDirective, HookContext};
use crate::summary::summarize_result;
use meshguard_audit::AuditSink;
use meshguard_core::{
    redact_params, AuditEvent, AuditOutcome, AuditVerbosity, ContextMap, GovernanceMode,
    MeshGuardConfig, PolicyDecision, PolicyEffect, PolicyEvaluationRequest,
};
use meshguard_policy::PolicyClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Message returned when an approval-gated action is attempted
const APPROVAL_UNSUPPORTED_MESSAGE: &str =
    "MeshGuard: Approval workflows are not yet implemented";

/// Message returned when evaluation fails and fail-open is off
const EVALUATION_FAILED_MESSAGE: &str = "MeshGuard: Policy evaluation failed";

/// Params checked, in order, for the resource an action targets
const RESOURCE_PARAM_KEYS: &[&str] = &["path", "file_path", "url", "resource"];

/// Pull the targeted resource out of the redacted parameters, when one of
/// the well-known keys carries a string value
fn resource_from_params(params: &ContextMap) -> Option<String> {
    RESOURCE_PARAM_KEYS
        .iter()
        .find_map(|key| params.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Per-invocation governance orchestration
pub struct DecisionGate {
    config: Arc<MeshGuardConfig>,
    policy: PolicyClient,
    audit: AuditSink,
}

impl DecisionGate {
    /// Create a gate over the shared policy client and audit sink
    pub fn new(config: Arc<MeshGuardConfig>, policy: PolicyClient, audit: AuditSink) -> Self {
        Self {
            config,
            policy,
            audit,
        }
    }

    /// Evaluate a tool call before it runs.
    ///
    /// Returns `None` to let the call proceed, or a [`BlockDirective`] the
    /// host must honor. Evaluation and audit errors never escape; the
    /// worst outcome for the host is a block directive.
    pub async fn before_tool_call(
        &self,
        event: &BeforeToolEvent,
        ctx: Option<&HookContext>,
    ) -> Option<BlockDirective> {
        if !self.config.enabled || self.config.mode == GovernanceMode::Bypass {
            return None;
        }

        let action = format!("tool:{}", event.tool_name);
        debug!(action = %action, "evaluating tool call");

        let redacted = redact_params(&event.params);
        let mut context = ContextMap::new();
        context.insert(
            "params".to_string(),
            Value::Object(redacted.clone().into_iter().collect()),
        );
        if let Some(session_key) = ctx.and_then(|c| c.session_key.as_deref()) {
            context.insert("sessionKey".to_string(), Value::String(session_key.into()));
        }

        let mut request = PolicyEvaluationRequest::new(&self.config.agent_id, &action)
            .with_context(context);
        if let Some(resource) = resource_from_params(&redacted) {
            request = request.with_resource(resource);
        }

        let response = match self.policy.evaluate(&request).await {
            Ok(response) if response.is_fail_open() => {
                // Gateway unreachable and fail-open configured: the call
                // proceeds unaudited rather than masking the outage.
                warn!(action = %action, "allowing tool call without audit after fail-open");
                return None;
            }
            Ok(response) => response,
            Err(err) => {
                if self.config.fail_open {
                    warn!(action = %action, error = %err, "allowing tool call after evaluation failure");
                    return None;
                }
                error!(action = %action, error = %err, "blocking tool call after evaluation failure");
                metrics::counter!("meshguard_decisions_total", "effect" => "eval_failed")
                    .increment(1);
                return Some(BlockDirective::with_reason(EVALUATION_FAILED_MESSAGE));
            }
        };

        let decision = response.decision.clone();
        info!(action = %action, effect = ?decision.effect, "policy decision");

        match decision.effect {
            PolicyEffect::Allow => {
                metrics::counter!("meshguard_decisions_total", "effect" => "allow").increment(1);
                self.audit
                    .enqueue(self.decision_audit(&action, AuditOutcome::Success, &redacted, decision));
                None
            }
            PolicyEffect::Deny => {
                metrics::counter!("meshguard_decisions_total", "effect" => "deny").increment(1);
                let message = decision.block_message();
                self.audit
                    .submit_immediate(self.decision_audit(
                        &action,
                        AuditOutcome::Blocked,
                        &redacted,
                        decision,
                    ))
                    .await;
                self.block_in_enforce_mode(&action, message)
            }
            PolicyEffect::ApprovalRequired => {
                metrics::counter!("meshguard_decisions_total", "effect" => "approval_required")
                    .increment(1);
                self.audit
                    .submit_immediate(self.decision_audit(
                        &action,
                        AuditOutcome::Blocked,
                        &redacted,
                        decision,
                    ))
                    .await;
                self.block_in_enforce_mode(&action, APPROVAL_UNSUPPORTED_MESSAGE.to_string())
            }
        }
    }

    /// Audit a completed tool call. Fire-and-forget: never blocks the
    /// host's continuation, never surfaces an error.
    pub async fn after_tool_call(&self, event: &AfterToolEvent, ctx: &HookContext) {
        if !self.config.enabled || self.config.mode == GovernanceMode::Bypass {
            return;
        }

        let action = format!("tool:{}", event.tool_name);
        let mut context = ContextMap::new();

        if self.config.audit_level == AuditVerbosity::Verbose {
            let redacted = redact_params(&event.params);
            context.insert(
                "params".to_string(),
                Value::Object(redacted.into_iter().collect()),
            );
        }
        if let Some(result) = &event.result {
            context.insert(
                "result".to_string(),
                summarize_result(result, self.config.audit_level),
            );
        }
        if let Some(session_key) = &ctx.session_key {
            context.insert(
                "sessionKey".to_string(),
                Value::String(session_key.clone()),
            );
        }

        let outcome = if event.error.is_some() {
            AuditOutcome::Failure
        } else {
            AuditOutcome::Success
        };

        let mut audit_event =
            AuditEvent::new(&self.config.agent_id, action, outcome).with_context(context);
        if let Some(duration_ms) = event.duration_ms {
            audit_event = audit_event.with_duration_ms(duration_ms);
        }
        if let Some(error) = &event.error {
            audit_event = audit_event.with_error(error.clone());
        }

        self.audit.enqueue(audit_event);
    }

    fn decision_audit(
        &self,
        action: &str,
        outcome: AuditOutcome,
        redacted_params: &ContextMap,
        decision: PolicyDecision,
    ) -> AuditEvent {
        let mut context = ContextMap::new();
        context.insert(
            "params".to_string(),
            Value::Object(redacted_params.clone().into_iter().collect()),
        );
        let mut event = AuditEvent::new(&self.config.agent_id, action, outcome)
            .with_context(context)
            .with_decision(decision);
        if let Some(resource) = resource_from_params(redacted_params) {
            event = event.with_resource(resource);
        }
        event
    }

    fn block_in_enforce_mode(&self, action: &str, message: String) -> Option<BlockDirective> {
        match self.config.mode {
            GovernanceMode::Enforce => Some(BlockDirective::with_reason(message)),
            _ => {
                // Audit mode: the denial is recorded but the call proceeds.
                info!(action = %action, "denial recorded without blocking");
                None
            }
        }
    }
}
