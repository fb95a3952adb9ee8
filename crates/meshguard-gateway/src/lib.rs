//! MeshGuard Gateway Client
//!
//! HTTPS implementation of the [`Gateway`] trait against the MeshGuard
//! governance gateway's JSON API.

pub mod http;

pub use http::HttpGateway;

pub use meshguard_core::Gateway;
