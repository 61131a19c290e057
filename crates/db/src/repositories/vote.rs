//! Vote repository.

use std::sync::Arc;

use crate::entities::{Vote, audit_log, vote};
use crate::repositories::AuditLogRepository;
use condovote_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QuerySelect, TransactionTrait, sea_query::OnConflict,
};

/// Number of votes per choice on a pauta.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ChoiceCount {
    pub choice: String,
    pub count: i64,
}

/// Number of votes recorded on a pauta.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct PautaVoteCount {
    pub pauta_id: String,
    pub count: i64,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a vote unless the unit already has one on the pauta.
    ///
    /// Returns `false` when the `(pauta_id, unit_id)` slot was already taken.
    pub async fn insert_if_absent(&self, model: vote::ActiveModel) -> AppResult<bool> {
        let inserted = insert_vote(self.db.as_ref(), model)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Insert a vote and its audit entry in one transaction.
    ///
    /// The audit entry is written only when the vote itself was inserted.
    pub async fn insert_with_audit(
        &self,
        model: vote::ActiveModel,
        audit: audit_log::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = self
            .db
            .transaction::<_, u64, DbErr>(|txn| {
                Box::pin(async move {
                    let inserted = insert_vote(txn, model).await?;
                    if inserted > 0 {
                        AuditLogRepository::append_with(txn, audit).await?;
                    }
                    Ok(inserted)
                })
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Find the vote a unit cast on a pauta.
    pub async fn find_by_pauta_and_unit(
        &self,
        pauta_id: &str,
        unit_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PautaId.eq(pauta_id))
            .filter(vote::Column::UnitId.eq(unit_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote counts grouped by choice. Choices with no votes are absent.
    pub async fn tally(&self, pauta_id: &str) -> AppResult<Vec<ChoiceCount>> {
        Vote::find()
            .select_only()
            .column(vote::Column::Choice)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::PautaId.eq(pauta_id))
            .group_by(vote::Column::Choice)
            .into_model::<ChoiceCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote totals for several pautas at once. Pautas with no votes are absent.
    pub async fn count_by_pautas(&self, pauta_ids: &[String]) -> AppResult<Vec<PautaVoteCount>> {
        if pauta_ids.is_empty() {
            return Ok(vec![]);
        }

        Vote::find()
            .select_only()
            .column(vote::Column::PautaId)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::PautaId.is_in(pauta_ids.iter().cloned()))
            .group_by(vote::Column::PautaId)
            .into_model::<PautaVoteCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn insert_vote<C: ConnectionTrait>(conn: &C, model: vote::ActiveModel) -> Result<u64, DbErr> {
    Vote::insert(model)
        .on_conflict(
            OnConflict::columns([vote::Column::PautaId, vote::Column::UnitId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::audit_log::AuditEvent;
    use crate::entities::vote::{VoteChoice, VoteOrigin};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set, Value};
    use serde_json::json;

    fn new_vote(unit_id: &str, choice: VoteChoice) -> vote::ActiveModel {
        vote::ActiveModel {
            id: Set(format!("v-{unit_id}")),
            pauta_id: Set("p1".to_string()),
            unit_id: Set(unit_id.to_string()),
            user_id: Set("u1".to_string()),
            choice: Set(choice),
            origin: Set(VoteOrigin::Web),
            ip: Set(None),
            user_agent: Set(None),
            created_at: Set(Utc::now().into()),
        }
    }

    fn new_audit() -> audit_log::ActiveModel {
        audit_log::ActiveModel {
            id: Set("log1".to_string()),
            condo_id: Set("condo1".to_string()),
            assembly_id: Set(Some("a1".to_string())),
            event_type: Set(AuditEvent::VoteCast),
            actor_id: Set("u1".to_string()),
            actor_role: Set("morador".to_string()),
            target_type: Set("pauta".to_string()),
            target_id: Set("p1".to_string()),
            details: Set(json!({ "choice": "yes" })),
            ip: Set(None),
            user_agent: Set(None),
            created_at: Set(Utc::now().into()),
        }
    }

    const fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_inserts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(repo.insert_if_absent(new_vote("101", VoteChoice::Yes)).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_taken_slot() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(!repo.insert_if_absent(new_vote("101", VoteChoice::No)).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_with_audit_writes_both() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let inserted = repo
            .insert_with_audit(new_vote("101", VoteChoice::Yes), new_audit())
            .await
            .unwrap();

        assert!(inserted);
    }

    #[tokio::test]
    async fn test_insert_with_audit_skips_audit_on_duplicate() {
        // Only one exec result: a second statement would exhaust the mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let inserted = repo
            .insert_with_audit(new_vote("101", VoteChoice::Yes), new_audit())
            .await
            .unwrap();

        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_tally_groups_by_choice() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "choice" => Value::String(Some(Box::new("yes".to_string()))),
                        "count" => Value::BigInt(Some(2)),
                    },
                    maplit::btreemap! {
                        "choice" => Value::String(Some(Box::new("no".to_string()))),
                        "count" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let counts = repo.tally("p1").await.unwrap();

        assert_eq!(
            counts,
            vec![
                ChoiceCount {
                    choice: "yes".to_string(),
                    count: 2
                },
                ChoiceCount {
                    choice: "no".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_count_by_pautas_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteRepository::new(db);
        assert!(repo.count_by_pautas(&[]).await.unwrap().is_empty());
    }
}
