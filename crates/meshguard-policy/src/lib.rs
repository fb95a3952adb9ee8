//! MeshGuard Policy Client
//!
//! Cached policy evaluation against the governance gateway.
//!
//! This crate provides:
//! - A TTL decision cache with read-side expiry and a bounded entry count
//! - The evaluation client that consults the cache before the network
//! - Fail-open / fail-closed conversion of transport and gateway errors

pub mod cache;
pub mod client;

pub use cache::{cache_key, PolicyCache};
pub use client::PolicyClient;
