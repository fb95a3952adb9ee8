//! Gateway wire contract
//!
//! JSON shapes exchanged with the MeshGuard gateway: policy evaluation
//! requests and responses, and audit events. Field names follow the
//! gateway's camelCase contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered key-value context attached to evaluations and audit events.
/// BTreeMap keeps serialization deterministic, which the cache key relies on.
pub type ContextMap = BTreeMap<String, serde_json::Value>;

/// Effect of a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyEffect {
    Allow,
    Deny,
    ApprovalRequired,
}

/// Alert level attached to a decision by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// A policy decision produced by the gateway (or synthesized on fail-open)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    /// What the policy decided
    pub effect: PolicyEffect,

    /// Identifier of the matching rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    /// Human-readable description of the matching rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_description: Option<String>,

    /// Alert level for dashboards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertLevel>,

    /// Why the decision was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PolicyDecision {
    /// Create a decision with only an effect
    pub fn new(effect: PolicyEffect) -> Self {
        Self {
            effect,
            rule: None,
            rule_description: None,
            alert: None,
            reason: None,
        }
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The message shown to the agent when this decision blocks a call
    pub fn block_message(&self) -> String {
        let detail = self
            .reason
            .as_deref()
            .or(self.rule_description.as_deref())
            .unwrap_or("Action denied by policy");
        format!("MeshGuard: {detail}")
    }
}

/// A policy evaluation request, constructed fresh per tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEvaluationRequest {
    /// Identity of the agent performing the action
    pub agent_id: String,

    /// Action identifier, by convention `tool:<name>`
    pub action: String,

    /// Resource the action targets, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Redacted context for the evaluation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextMap>,

    /// When the request was built
    pub timestamp: DateTime<Utc>,
}

impl PolicyEvaluationRequest {
    /// Create a request for an action by an agent
    pub fn new(agent_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            action: action.into(),
            resource: None,
            context: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach redacted context
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach a resource identifier
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

/// Evaluation id stamped on decisions synthesized when the gateway is
/// unreachable and fail-open is enabled
pub const FAIL_OPEN_EVALUATION_ID: &str = "fail-open";

/// The gateway's response to a policy evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEvaluationResponse {
    /// The decision
    pub decision: PolicyDecision,

    /// Gateway-assigned id for this evaluation
    pub evaluation_id: String,

    /// When the gateway evaluated the request
    pub evaluated_at: DateTime<Utc>,

    /// Version of the policy set that produced the decision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
}

impl PolicyEvaluationResponse {
    /// Whether this decision was synthesized locally because the gateway
    /// could not be reached
    pub fn is_fail_open(&self) -> bool {
        self.evaluation_id == FAIL_OPEN_EVALUATION_ID
    }
}

/// Outcome of the audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Blocked,
}

/// An audit event delivered to the gateway.
///
/// Created by the decision gate or the after-tool hook, enqueued into the
/// audit sink, and terminal once submitted: delivered or dropped, never
/// retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Identity of the agent
    pub agent_id: String,

    /// Action identifier, `tool:<name>`
    pub action: String,

    /// Resource the action targeted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Redacted context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextMap>,

    /// How the action ended
    #[serde(rename = "result")]
    pub outcome: AuditOutcome,

    /// Decision that governed the action, when one was made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<PolicyDecision>,

    /// Tool execution time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Error text when the tool failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the event was created
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an audit event for an action with the given outcome
    pub fn new(
        agent_id: impl Into<String>,
        action: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            action: action.into(),
            resource: None,
            context: None,
            outcome,
            decision: None,
            duration_ms: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach redacted context
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the resource the action targeted
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attach the governing decision
    pub fn with_decision(mut self, decision: PolicyDecision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Attach the tool execution time
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Attach error text
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
