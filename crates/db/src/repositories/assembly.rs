//! Assembly repository.

use std::sync::Arc;

use crate::entities::{Assembly, assembly, assembly::AssemblyStatus};
use chrono::Utc;
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Assembly repository for database operations.
#[derive(Clone)]
pub struct AssemblyRepository {
    db: Arc<DatabaseConnection>,
}

impl AssemblyRepository {
    /// Create a new assembly repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an assembly by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<assembly::Model>> {
        Assembly::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an assembly by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<assembly::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assembleia não encontrada: {id}")))
    }

    /// List a condominium's assemblies, most recently scheduled first.
    pub async fn find_by_condo(
        &self,
        condo_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<assembly::Model>> {
        Assembly::find()
            .filter(assembly::Column::CondoId.eq(condo_id))
            .order_by_desc(assembly::Column::ScheduledAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new assembly.
    pub async fn create(&self, model: assembly::ActiveModel) -> AppResult<assembly::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an assembly.
    pub async fn update(&self, model: assembly::ActiveModel) -> AppResult<assembly::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move an assembly from `from` to `to`, stamping the matching timestamp.
    ///
    /// Returns `None` when the assembly was not in `from` at update time.
    pub async fn transition(
        &self,
        id: &str,
        from: AssemblyStatus,
        to: AssemblyStatus,
    ) -> AppResult<Option<assembly::Model>> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut update = Assembly::update_many()
            .col_expr(assembly::Column::Status, Expr::value(to))
            .filter(assembly::Column::Id.eq(id))
            .filter(assembly::Column::Status.eq(from));
        update = match to {
            AssemblyStatus::Open => update.col_expr(assembly::Column::OpenedAt, Expr::value(now)),
            AssemblyStatus::Closed => update.col_expr(assembly::Column::ClosedAt, Expr::value(now)),
            AssemblyStatus::Scheduled => update,
        };

        let updated = update
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(updated.into_iter().next())
    }
}
