//! HTTP API layer for condovote.
//!
//! Exposes the governance services over JSON:
//! - Assemblies and their agenda (pautas)
//! - Vote casting and tallies
//! - Presence confirmation
//! - Enquetes (polls outside assemblies)
//! - The audit trail
//!
//! Every route except `/health` requires a bearer token resolved by
//! [`middleware::auth_middleware`].

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
