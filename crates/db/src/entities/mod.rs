//! Database entities.

#![allow(missing_docs)]

pub mod assembly;
pub mod audit_log;
pub mod enquete;
pub mod enquete_option;
pub mod enquete_vote;
pub mod pauta;
pub mod presence;
pub mod profile;
pub mod unit;
pub mod vote;

pub use assembly::Entity as Assembly;
pub use audit_log::Entity as AuditLog;
pub use enquete::Entity as Enquete;
pub use enquete_option::Entity as EnqueteOption;
pub use enquete_vote::Entity as EnqueteVote;
pub use pauta::Entity as Pauta;
pub use presence::Entity as Presence;
pub use profile::Entity as Profile;
pub use unit::Entity as Unit;
pub use vote::Entity as Vote;
