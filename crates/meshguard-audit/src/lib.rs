//! MeshGuard Audit Sink
//!
//! Buffered delivery of audit events to the governance gateway.
//!
//! Events accumulate in an ordered queue and leave in a single batch when
//! the queue reaches its size threshold or a debounced timer elapses.
//! Compliance-significant events (denials) skip the queue through the
//! immediate path. Delivery is best-effort: a failed batch is logged and
//! dropped, never retried, and never affects an enforcement decision that
//! was already made.

pub mod sink;

pub use sink::AuditSink;
