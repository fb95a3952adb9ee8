//! MeshGuard Plugin
//!
//! Governance interceptor for AI agent runtimes.
//!
//! The host runtime wires three handlers into its tool lifecycle:
//! - [`MeshGuard::before_tool_call`], awaited before a tool runs; may
//!   return a [`BlockDirective`] that stops the call
//! - [`MeshGuard::after_tool_call`], fire-and-forget audit of the outcome
//! - [`MeshGuard::shutdown`], the final audit drain on the host's shutdown
//!   lifecycle event
//!
//! Every component is an explicit instance built once at plugin
//! initialization; there is no global state.

pub mod gate;
pub mod hooks;
pub mod plugin;
pub mod summary;

pub use gate::DecisionGate;
pub use hooks::{AfterToolEvent, BeforeToolEvent, BlockDirective, HookContext};
pub use plugin::MeshGuard;

pub use meshguard_core::{AuditVerbosity, GovernanceMode, MeshGuardConfig};
