//! Residential unit entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A residential unit, the atomic voting entity of a condominium.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning condominium (tenant partition key).
    #[sea_orm(indexed)]
    pub condo_id: String,

    /// Block or tower, if the condominium has more than one.
    #[sea_orm(nullable)]
    pub block: Option<String>,

    /// Unit number within the block.
    pub number: String,

    /// Whether the unit has overdue condominium fees.
    pub is_defaulter: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Human-readable label, e.g. `B-101`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.block {
            Some(block) => format!("{block}-{}", self.number),
            None => self.number.clone(),
        }
    }
}
