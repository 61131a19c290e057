//! Unit repository.

use std::sync::Arc;

use crate::entities::{Unit, unit};
use condovote_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Read access to the unit registry.
#[derive(Clone)]
pub struct UnitRepository {
    db: Arc<DatabaseConnection>,
}

impl UnitRepository {
    /// Create a new unit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a unit by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<unit::Model>> {
        Unit::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a unit by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<unit::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Unidade não encontrada: {id}")))
    }

    /// List the units of a condominium.
    pub async fn find_by_condo(&self, condo_id: &str) -> AppResult<Vec<unit::Model>> {
        Unit::find()
            .filter(unit::Column::CondoId.eq(condo_id))
            .order_by_asc(unit::Column::Block)
            .order_by_asc(unit::Column::Number)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Register a unit.
    pub async fn create(&self, model: unit::ActiveModel) -> AppResult<unit::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
