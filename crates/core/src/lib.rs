//! Governance core for condovote: assemblies, pautas, votes, presence,
//! the audit trail and enquetes.

pub mod services;

pub use services::*;
