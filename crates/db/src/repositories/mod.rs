//! Repositories for database access.

pub mod assembly;
pub mod audit_log;
pub mod enquete;
pub mod pauta;
pub mod presence;
pub mod profile;
pub mod unit;
pub mod vote;

pub use assembly::AssemblyRepository;
pub use audit_log::AuditLogRepository;
pub use enquete::{EnqueteRepository, OptionCount};
pub use pauta::{PautaRepository, VotingStart};
pub use presence::PresenceRepository;
pub use profile::ProfileRepository;
pub use unit::UnitRepository;
pub use vote::{ChoiceCount, PautaVoteCount, VoteRepository};
