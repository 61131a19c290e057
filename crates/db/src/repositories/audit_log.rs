//! Audit log repository. Append-only: there is no update or delete path.

use std::sync::Arc;

use crate::entities::{AuditLog, audit_log};
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Audit log repository for database operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    db: Arc<DatabaseConnection>,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry.
    pub async fn append(&self, model: audit_log::ActiveModel) -> AppResult<()> {
        Self::append_with(self.db.as_ref(), model)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append an entry on an arbitrary connection, typically an open transaction.
    pub async fn append_with<C: ConnectionTrait>(
        conn: &C,
        model: audit_log::ActiveModel,
    ) -> Result<(), DbErr> {
        AuditLog::insert(model).exec_without_returning(conn).await?;
        Ok(())
    }

    /// Entries for an assembly, oldest first.
    pub async fn find_by_assembly(
        &self,
        assembly_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_log::Model>> {
        AuditLog::find()
            .filter(audit_log::Column::AssemblyId.eq(assembly_id))
            .order_by_asc(audit_log::Column::CreatedAt)
            .order_by_asc(audit_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries for a condominium, oldest first.
    pub async fn find_by_condo(
        &self,
        condo_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_log::Model>> {
        AuditLog::find()
            .filter(audit_log::Column::CondoId.eq(condo_id))
            .order_by_asc(audit_log::Column::CreatedAt)
            .order_by_asc(audit_log::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries about a single target.
    pub async fn find_by_target(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<audit_log::Model>> {
        AuditLog::find()
            .filter(audit_log::Column::TargetType.eq(target_type))
            .filter(audit_log::Column::TargetId.eq(target_id))
            .order_by_asc(audit_log::Column::CreatedAt)
            .order_by_asc(audit_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
