//! Pauta repository.

use std::sync::Arc;

use crate::entities::{Assembly, Pauta, pauta, pauta::PautaStatus};
use chrono::Utc;
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Outcome of moving a pauta into `voting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotingStart {
    /// The pauta as stored after the update.
    Started(pauta::Model),
    /// The pauta was no longer `pending` when the update ran.
    NotPending,
    /// Another pauta of the assembly is already `voting`.
    SiblingVoting,
}

#[derive(Debug, FromQueryResult)]
struct MaxOrderIndex {
    max_order_index: Option<i32>,
}

/// Pauta repository for database operations.
#[derive(Clone)]
pub struct PautaRepository {
    db: Arc<DatabaseConnection>,
}

impl PautaRepository {
    /// Create a new pauta repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a pauta by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<pauta::Model>> {
        Pauta::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a pauta by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<pauta::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pauta não encontrada: {id}")))
    }

    /// Highest `order_index` in an assembly, `None` when it has no pautas.
    pub async fn max_order_index(&self, assembly_id: &str) -> AppResult<Option<i32>> {
        let row = Pauta::find()
            .select_only()
            .column_as(pauta::Column::OrderIndex.max(), "max_order_index")
            .filter(pauta::Column::AssemblyId.eq(assembly_id))
            .into_model::<MaxOrderIndex>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.and_then(|r| r.max_order_index))
    }

    /// Create a new pauta.
    ///
    /// A concurrent create that took the same `order_index` surfaces as a conflict.
    pub async fn create(&self, model: pauta::ActiveModel) -> AppResult<pauta::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_order_conflict(&e))
    }

    /// Move a `pending` pauta into `voting`.
    ///
    /// The status check is part of the update, so of two concurrent callers
    /// only one gets [`VotingStart::Started`]. With `exclusive` the assembly
    /// row is locked first and the call fails while a sibling is voting.
    pub async fn start_voting(
        &self,
        id: &str,
        assembly_id: &str,
        exclusive: bool,
    ) -> AppResult<VotingStart> {
        if !exclusive {
            return start_voting_on(self.db.as_ref(), id)
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        }

        let id = id.to_string();
        let assembly_id = assembly_id.to_string();
        self.db
            .transaction::<_, VotingStart, DbErr>(|txn| {
                Box::pin(async move {
                    Assembly::find_by_id(assembly_id.clone())
                        .lock_exclusive()
                        .one(txn)
                        .await?;
                    let voting = Pauta::find()
                        .filter(pauta::Column::AssemblyId.eq(assembly_id.as_str()))
                        .filter(pauta::Column::Status.eq(PautaStatus::Voting))
                        .count(txn)
                        .await?;
                    if voting > 0 {
                        return Ok(VotingStart::SiblingVoting);
                    }
                    start_voting_on(txn, &id).await
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Move a `voting` pauta to `closed`. `None` when it was not voting.
    pub async fn finish_voting(&self, id: &str) -> AppResult<Option<pauta::Model>> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let updated = Pauta::update_many()
            .col_expr(pauta::Column::Status, Expr::value(PautaStatus::Closed))
            .col_expr(pauta::Column::ClosedAt, Expr::value(now))
            .filter(pauta::Column::Id.eq(id))
            .filter(pauta::Column::Status.eq(PautaStatus::Voting))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(updated.into_iter().next())
    }

    /// List an assembly's pautas in presentation order.
    pub async fn find_by_assembly(&self, assembly_id: &str) -> AppResult<Vec<pauta::Model>> {
        Pauta::find()
            .filter(pauta::Column::AssemblyId.eq(assembly_id))
            .order_by_asc(pauta::Column::OrderIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List an assembly's pautas currently in `voting`.
    pub async fn find_voting_by_assembly(
        &self,
        assembly_id: &str,
    ) -> AppResult<Vec<pauta::Model>> {
        Pauta::find()
            .filter(pauta::Column::AssemblyId.eq(assembly_id))
            .filter(pauta::Column::Status.eq(PautaStatus::Voting))
            .order_by_asc(pauta::Column::OrderIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn start_voting_on<C: ConnectionTrait>(conn: &C, id: &str) -> Result<VotingStart, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let updated = Pauta::update_many()
        .col_expr(pauta::Column::Status, Expr::value(PautaStatus::Voting))
        .col_expr(pauta::Column::OpenedAt, Expr::value(now))
        .filter(pauta::Column::Id.eq(id))
        .filter(pauta::Column::Status.eq(PautaStatus::Pending))
        .exec_with_returning(conn)
        .await?;
    Ok(updated
        .into_iter()
        .next()
        .map_or(VotingStart::NotPending, VotingStart::Started))
}

fn map_order_conflict(err: &DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
            "Outra pauta foi criada ao mesmo tempo; tente novamente".to_string(),
        ),
        _ => AppError::Database(err.to_string()),
    }
}
