//! Pauta (agenda item) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a pauta. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum PautaStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "voting")]
    Voting,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl Default for PautaStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Threshold rule used to interpret a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum QuorumType {
    /// Simple majority.
    #[sea_orm(string_value = "simple")]
    Simple,
    /// Custom numeric threshold stored in `quorum_custom`.
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl Default for QuorumType {
    fn default() -> Self {
        Self::Simple
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pauta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub assembly_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub quorum_type: QuorumType,

    /// Threshold when `quorum_type` is custom.
    #[sea_orm(nullable)]
    pub quorum_custom: Option<i32>,

    /// Presentation order, unique within the assembly. Gaps are allowed.
    pub order_index: i32,

    pub status: PautaStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub opened_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assembly::Entity",
        from = "Column::AssemblyId",
        to = "super::assembly::Column::Id",
        on_delete = "Cascade"
    )]
    Assembly,
}

impl Related<super::assembly::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assembly.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
