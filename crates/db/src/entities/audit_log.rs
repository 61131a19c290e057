//! Audit log entity.
//!
//! Write-once: no repository exposes an update or delete path for this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Governance event recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
pub enum AuditEvent {
    #[sea_orm(string_value = "assembly.created")]
    #[serde(rename = "assembly.created")]
    AssemblyCreated,
    #[sea_orm(string_value = "assembly.opened")]
    #[serde(rename = "assembly.opened")]
    AssemblyOpened,
    #[sea_orm(string_value = "assembly.closed")]
    #[serde(rename = "assembly.closed")]
    AssemblyClosed,
    #[sea_orm(string_value = "assembly.minutes_attached")]
    #[serde(rename = "assembly.minutes_attached")]
    MinutesAttached,
    #[sea_orm(string_value = "pauta.created")]
    #[serde(rename = "pauta.created")]
    PautaCreated,
    #[sea_orm(string_value = "pauta.opened")]
    #[serde(rename = "pauta.opened")]
    PautaOpened,
    #[sea_orm(string_value = "pauta.closed")]
    #[serde(rename = "pauta.closed")]
    PautaClosed,
    #[sea_orm(string_value = "vote.cast")]
    #[serde(rename = "vote.cast")]
    VoteCast,
    #[sea_orm(string_value = "presence.confirmed")]
    #[serde(rename = "presence.confirmed")]
    PresenceConfirmed,
    #[sea_orm(string_value = "enquete.created")]
    #[serde(rename = "enquete.created")]
    EnqueteCreated,
    #[sea_orm(string_value = "enquete.voted")]
    #[serde(rename = "enquete.voted")]
    EnqueteVoted,
}

impl AuditEvent {
    /// Dotted event name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AssemblyCreated => "assembly.created",
            Self::AssemblyOpened => "assembly.opened",
            Self::AssemblyClosed => "assembly.closed",
            Self::MinutesAttached => "assembly.minutes_attached",
            Self::PautaCreated => "pauta.created",
            Self::PautaOpened => "pauta.opened",
            Self::PautaClosed => "pauta.closed",
            Self::VoteCast => "vote.cast",
            Self::PresenceConfirmed => "presence.confirmed",
            Self::EnqueteCreated => "enquete.created",
            Self::EnqueteVoted => "enquete.voted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    /// ULID, so ties on `created_at` still sort by insertion.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub condo_id: String,

    /// Null for events outside an assembly (enquetes).
    #[sea_orm(indexed, nullable)]
    pub assembly_id: Option<String>,

    pub event_type: AuditEvent,

    pub actor_id: String,

    pub actor_role: String,

    pub target_type: String,

    pub target_id: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub details: JsonValue,

    #[sea_orm(nullable)]
    pub ip: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
