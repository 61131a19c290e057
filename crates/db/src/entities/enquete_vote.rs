//! Enquete vote entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquete_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub enquete_id: String,

    #[sea_orm(indexed)]
    pub option_id: String,

    pub unit_id: String,

    pub user_id: String,

    /// Equals `unit_id` when the enquete is one-vote-per-unit, null otherwise.
    /// Unique together with `enquete_id`; nulls never collide.
    #[sea_orm(nullable)]
    pub exclusive_unit_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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

    #[sea_orm(
        belongs_to = "super::enquete_option::Entity",
        from = "Column::OptionId",
        to = "super::enquete_option::Column::Id",
        on_delete = "Cascade"
    )]
    EnqueteOption,
}

impl Related<super::enquete::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enquete.def()
    }
}

impl Related<super::enquete_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EnqueteOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
