//! Enquete (poll) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A condominium-scoped poll, independent of any assembly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquete")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub condo_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// A unit may vote once for the whole enquete.
    pub one_vote_per_unit: bool,

    pub start_at: DateTimeWithTimeZone,

    pub end_at: DateTimeWithTimeZone,

    pub created_by: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `now` falls inside `[start_at, end_at]`.
    #[must_use]
    pub fn is_open_at(&self, now: DateTimeWithTimeZone) -> bool {
        self.start_at <= now && now <= self.end_at
    }
}
