//! Governance services.

#![allow(missing_docs)]

pub mod access;
pub mod assembly;
pub mod audit;
pub mod enquete;
pub mod pauta;
pub mod presence;
pub mod session;
pub mod vote;

#[cfg(test)]
mod fixtures;

pub use access::{Actor, ClientInfo, Permission};
pub use assembly::{AssemblyService, CreateAssemblyInput};
pub use audit::{AuditEntry, AuditService};
pub use enquete::{CreateEnqueteInput, EnqueteResults, EnqueteService, EnqueteWithOptions, OptionResult};
pub use pauta::{CreatePautaInput, PautaService, PautaWithCount, Tally};
pub use presence::{PresenceConfirmation, PresenceService};
pub use session::SessionService;
pub use vote::{CastVoteInput, VoteService};
