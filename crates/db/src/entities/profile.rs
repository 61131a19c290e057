//! User profile entity.
//!
//! A profile binds an authenticated user to a condominium, an optional unit
//! and a role. It is the server-side source of truth for who the actor is.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user within a condominium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Resident of a unit.
    #[sea_orm(string_value = "morador")]
    Morador,
    /// Doorman / front desk staff.
    #[sea_orm(string_value = "porteiro")]
    Porteiro,
    /// Deputy building manager.
    #[sea_orm(string_value = "subsindico")]
    Subsindico,
    /// Building manager.
    #[sea_orm(string_value = "sindico")]
    Sindico,
    /// Platform operator, not bound to a single condominium.
    #[sea_orm(string_value = "superadmin")]
    Superadmin,
}

impl Default for Role {
    fn default() -> Self {
        Self::Morador
    }
}

impl Role {
    /// Stored string value of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morador => "morador",
            Self::Porteiro => "porteiro",
            Self::Subsindico => "subsindico",
            Self::Sindico => "sindico",
            Self::Superadmin => "superadmin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    /// User ID issued by the authentication provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub condo_id: String,

    /// Unit the user represents, if any.
    #[sea_orm(nullable)]
    pub unit_id: Option<String>,

    pub role: Role,

    pub name: String,

    /// Current session token.
    #[sea_orm(nullable, unique)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id",
        on_delete = "SetNull"
    )]
    Unit,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
