//! Presence repository.

use std::sync::Arc;

use crate::entities::{Presence, presence};
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};

/// Presence repository for database operations.
#[derive(Clone)]
pub struct PresenceRepository {
    db: Arc<DatabaseConnection>,
}

impl PresenceRepository {
    /// Create a new presence repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record presence unless the unit is already present.
    ///
    /// Returns `false` when a row for `(assembly_id, unit_id)` already existed.
    pub async fn insert_if_absent(&self, model: presence::ActiveModel) -> AppResult<bool> {
        let inserted = Presence::insert(model)
            .on_conflict(
                OnConflict::columns([presence::Column::AssemblyId, presence::Column::UnitId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Find a unit's presence record for an assembly.
    pub async fn find(
        &self,
        assembly_id: &str,
        unit_id: &str,
    ) -> AppResult<Option<presence::Model>> {
        Presence::find()
            .filter(presence::Column::AssemblyId.eq(assembly_id))
            .filter(presence::Column::UnitId.eq(unit_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a unit is present.
    pub async fn exists(&self, assembly_id: &str, unit_id: &str) -> AppResult<bool> {
        let count = Presence::find()
            .filter(presence::Column::AssemblyId.eq(assembly_id))
            .filter(presence::Column::UnitId.eq(unit_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// All presence records for an assembly, in confirmation order.
    pub async fn find_by_assembly(&self, assembly_id: &str) -> AppResult<Vec<presence::Model>> {
        Presence::find()
            .filter(presence::Column::AssemblyId.eq(assembly_id))
            .order_by_asc(presence::Column::ConfirmedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
