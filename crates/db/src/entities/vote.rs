//! Vote entity. One immutable row per (pauta, unit).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Choice recorded by a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    #[sea_orm(string_value = "yes")]
    Yes,
    #[sea_orm(string_value = "no")]
    No,
    #[sea_orm(string_value = "abstain")]
    Abstain,
}

impl VoteChoice {
    /// Stored string value of the choice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Abstain => "abstain",
        }
    }
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "abstain" => Ok(Self::Abstain),
            other => Err(format!("Opção de voto inválida: {other}")),
        }
    }
}

/// Channel the vote arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VoteOrigin {
    #[sea_orm(string_value = "web")]
    Web,
    #[sea_orm(string_value = "app")]
    App,
    /// Registered in the meeting room.
    #[sea_orm(string_value = "in_person")]
    InPerson,
}

impl Default for VoteOrigin {
    fn default() -> Self {
        Self::Web
    }
}

impl VoteOrigin {
    /// Stored string value of the origin.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::App => "app",
            Self::InPerson => "in_person",
        }
    }
}

impl FromStr for VoteOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Self::Web),
            "app" => Ok(Self::App),
            "in_person" => Ok(Self::InPerson),
            other => Err(format!("Origem de voto inválida: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Unique together with `unit_id`.
    #[sea_orm(indexed)]
    pub pauta_id: String,

    pub unit_id: String,

    /// Authenticated user who cast the vote on behalf of the unit.
    pub user_id: String,

    pub choice: VoteChoice,

    pub origin: VoteOrigin,

    #[sea_orm(nullable)]
    pub ip: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pauta::Entity",
        from = "Column::PautaId",
        to = "super::pauta::Column::Id",
        on_delete = "Cascade"
    )]
    Pauta,

    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id",
        on_delete = "Restrict"
    )]
    Unit,
}

impl Related<super::pauta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pauta.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
