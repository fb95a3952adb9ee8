//! Gateway trait
//!
//! The seam between the governance core and the remote gateway. The
//! production implementation lives in `meshguard-gateway`; tests substitute
//! in-memory doubles.

use crate::error::Result;
use crate::types::{AuditEvent, PolicyEvaluationRequest, PolicyEvaluationResponse};
use async_trait::async_trait;

/// Remote policy decision point and audit collector
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Evaluate a policy request
    async fn evaluate(
        &self,
        request: &PolicyEvaluationRequest,
    ) -> Result<PolicyEvaluationResponse>;

    /// Deliver a batch of audit events
    async fn submit_audit_batch(&self, events: &[AuditEvent]) -> Result<()>;

    /// Deliver a single audit event, bypassing batching
    async fn submit_audit_event(&self, event: &AuditEvent) -> Result<()>;
}
