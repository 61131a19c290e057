//! Enquete option entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquete_option")]
pub struct Model {
    /// Stable identifier assigned at creation.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub enquete_id: String,

    pub label: String,

    /// 0-based display position.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enquete::Entity",
        from = "Column::EnqueteId",
        to = "super::enquete::Column::Id",
        on_delete = "Cascade"
    )]
    Enquete,
}

impl Related<super::enquete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enquete.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
