//! Enquete repository.

use std::sync::Arc;

use crate::entities::{Enquete, EnqueteOption, EnqueteVote, enquete, enquete_option, enquete_vote};
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, sea_query::OnConflict,
};

/// Number of votes recorded for an enquete option.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct OptionCount {
    pub option_id: String,
    pub count: i64,
}

/// Enquete repository for database operations.
#[derive(Clone)]
pub struct EnqueteRepository {
    db: Arc<DatabaseConnection>,
}

impl EnqueteRepository {
    /// Create a new enquete repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an enquete by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<enquete::Model>> {
        Enquete::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an enquete by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<enquete::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enquete não encontrada: {id}")))
    }

    /// Create an enquete together with its options.
    pub async fn create_with_options(
        &self,
        model: enquete::ActiveModel,
        options: Vec<enquete_option::ActiveModel>,
    ) -> AppResult<()> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    Enquete::insert(model).exec_without_returning(txn).await?;
                    EnqueteOption::insert_many(options)
                        .exec_without_returning(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of an enquete by display position.
    pub async fn find_options(&self, enquete_id: &str) -> AppResult<Vec<enquete_option::Model>> {
        EnqueteOption::find()
            .filter(enquete_option::Column::EnqueteId.eq(enquete_id))
            .order_by_asc(enquete_option::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an option, scoped to its enquete.
    pub async fn find_option(
        &self,
        enquete_id: &str,
        option_id: &str,
    ) -> AppResult<Option<enquete_option::Model>> {
        EnqueteOption::find_by_id(option_id)
            .filter(enquete_option::Column::EnqueteId.eq(enquete_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a condominium's enquetes, newest first.
    pub async fn find_by_condo(
        &self,
        condo_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<enquete::Model>> {
        Enquete::find()
            .filter(enquete::Column::CondoId.eq(condo_id))
            .order_by_desc(enquete::Column::StartAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote unless `(enquete_id, exclusive_unit_id)` is already taken.
    ///
    /// Rows with a null `exclusive_unit_id` never conflict.
    pub async fn insert_vote_if_absent(&self, model: enquete_vote::ActiveModel) -> AppResult<bool> {
        let inserted = EnqueteVote::insert(model)
            .on_conflict(
                OnConflict::columns([
                    enquete_vote::Column::EnqueteId,
                    enquete_vote::Column::ExclusiveUnitId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// The vote a unit holds on a one-vote-per-unit enquete.
    pub async fn find_unit_vote(
        &self,
        enquete_id: &str,
        unit_id: &str,
    ) -> AppResult<Option<enquete_vote::Model>> {
        EnqueteVote::find()
            .filter(enquete_vote::Column::EnqueteId.eq(enquete_id))
            .filter(enquete_vote::Column::ExclusiveUnitId.eq(unit_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote counts grouped by option. Options with no votes are absent.
    pub async fn count_by_option(&self, enquete_id: &str) -> AppResult<Vec<OptionCount>> {
        EnqueteVote::find()
            .select_only()
            .column(enquete_vote::Column::OptionId)
            .column_as(enquete_vote::Column::Id.count(), "count")
            .filter(enquete_vote::Column::EnqueteId.eq(enquete_id))
            .group_by(enquete_vote::Column::OptionId)
            .into_model::<OptionCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
