//! MeshGuard Core
//!
//! Shared types and utilities for the MeshGuard governance interceptor.
//!
//! This crate provides:
//! - The gateway wire contract (policy decisions, evaluation requests, audit events)
//! - Governance configuration with validation
//! - Error types and result handling
//! - Sensitive-parameter redaction
//! - The `Gateway` trait implemented by the HTTPS client and by test doubles

pub mod config;
pub mod error;
pub mod gateway;
pub mod redact;
pub mod types;

pub use config::{AuditVerbosity, GovernanceMode, MeshGuardConfig};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use redact::{redact_params, REDACTION_MARKER, TRUNCATION_MARKER};
pub use types::{
    AuditEvent, AuditOutcome, ContextMap, PolicyDecision, PolicyEffect,
    PolicyEvaluationRequest, PolicyEvaluationResponse, FAIL_OPEN_EVALUATION_ID,
};
