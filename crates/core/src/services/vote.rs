//! Vote ledger.
//!
//! At most one vote per `(pauta, unit)`. The unique index on that pair is the
//! authority: an insert that finds the slot taken reports the recorded choice
//! and never overwrites it.

use crate::services::access::{Actor, ClientInfo, Permission};
use crate::services::audit::{AuditEntry, AuditService};
use chrono::Utc;
use condovote_common::{AppError, AppResult, AuditMode, IdGenerator};
use condovote_db::{
    entities::{
        assembly::AssemblyStatus,
        audit_log::AuditEvent,
        pauta::PautaStatus,
        vote::{self, VoteChoice, VoteOrigin},
    },
    repositories::{
        AssemblyRepository, PautaRepository, PresenceRepository, UnitRepository, VoteRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;

/// Input for casting a vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteInput {
    #[serde(alias = "pauta_id")]
    pub pauta_id: String,
    pub choice: String,
    pub origin: Option<String>,
    /// Defaults to the actor's own unit.
    #[serde(alias = "unit_id")]
    pub unit_id: Option<String>,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    pauta_repo: PautaRepository,
    assembly_repo: AssemblyRepository,
    presence_repo: PresenceRepository,
    unit_repo: UnitRepository,
    audit: AuditService,
    audit_mode: AuditMode,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        pauta_repo: PautaRepository,
        assembly_repo: AssemblyRepository,
        presence_repo: PresenceRepository,
        unit_repo: UnitRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            vote_repo,
            pauta_repo,
            assembly_repo,
            presence_repo,
            unit_repo,
            audit,
            audit_mode: AuditMode::BestEffort,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set how the `vote.cast` audit entry is written.
    #[must_use]
    pub const fn with_audit_mode(mut self, audit_mode: AuditMode) -> Self {
        self.audit_mode = audit_mode;
        self
    }

    /// Cast a unit's vote on a pauta.
    pub async fn cast(
        &self,
        actor: &Actor,
        input: CastVoteInput,
        client: &ClientInfo,
    ) -> AppResult<vote::Model> {
        let choice: VoteChoice = input.choice.parse().map_err(AppError::Validation)?;
        let origin = match input.origin.as_deref() {
            Some(origin) => origin.parse::<VoteOrigin>().map_err(AppError::Validation)?,
            None => VoteOrigin::default(),
        };

        actor.require(Permission::CastVote)?;
        let unit_id = actor.own_unit(input.unit_id.as_deref())?;

        let pauta = self.pauta_repo.get_by_id(&input.pauta_id).await?;
        let assembly = self.assembly_repo.get_by_id(&pauta.assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        if assembly.status != AssemblyStatus::Open {
            return Err(AppError::InvalidState(
                "A assembleia não está aberta para votação".to_string(),
            ));
        }
        if pauta.status != PautaStatus::Voting {
            return Err(AppError::InvalidState(
                "Esta pauta não está em votação".to_string(),
            ));
        }
        if assembly.require_presence && !self.presence_repo.exists(&assembly.id, &unit_id).await? {
            return Err(AppError::Forbidden(
                "Confirme sua presença antes de votar".to_string(),
            ));
        }
        if assembly.block_defaulters && self.unit_repo.get_by_id(&unit_id).await?.is_defaulter {
            return Err(AppError::Forbidden(
                "Unidades inadimplentes não podem votar nesta assembleia".to_string(),
            ));
        }

        let vote = vote::Model {
            id: self.id_gen.generate(),
            pauta_id: pauta.id.clone(),
            unit_id: unit_id.clone(),
            user_id: actor.user_id.clone(),
            choice,
            origin,
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            created_at: Utc::now().into(),
        };
        let entry = AuditEntry {
            condo_id: assembly.condo_id.clone(),
            assembly_id: Some(assembly.id.clone()),
            event: AuditEvent::VoteCast,
            target_type: "pauta",
            target_id: pauta.id.clone(),
            details: json!({
                "voteId": vote.id,
                "unitId": unit_id,
                "choice": choice.as_str(),
                "origin": origin.as_str(),
            }),
        };

        let inserted = match self.audit_mode {
            AuditMode::Atomic => {
                let audit_row = self.audit.build(actor, client, entry);
                self.vote_repo
                    .insert_with_audit(to_active(&vote), audit_row)
                    .await?
            }
            AuditMode::BestEffort => {
                let inserted = self.vote_repo.insert_if_absent(to_active(&vote)).await?;
                if inserted {
                    self.audit.record(actor, client, entry).await;
                }
                inserted
            }
        };

        if !inserted {
            return Err(self.already_voted(&pauta.id, &unit_id).await);
        }

        tracing::info!(
            vote_id = %vote.id,
            pauta_id = %vote.pauta_id,
            unit_id = %vote.unit_id,
            origin = origin.as_str(),
            "Vote cast"
        );

        Ok(vote)
    }

    /// Rejection for a unit whose slot on the pauta is already taken.
    async fn already_voted(&self, pauta_id: &str, unit_id: &str) -> AppError {
        match self.vote_repo.find_by_pauta_and_unit(pauta_id, unit_id).await {
            Ok(Some(existing)) => AppError::AlreadyVoted {
                message: "Sua unidade já votou nesta pauta".to_string(),
                existing_choice: existing.choice.as_str().to_string(),
            },
            Ok(None) => AppError::Conflict("Sua unidade já votou nesta pauta".to_string()),
            Err(e) => e,
        }
    }
}

fn to_active(vote: &vote::Model) -> vote::ActiveModel {
    vote::ActiveModel {
        id: Set(vote.id.clone()),
        pauta_id: Set(vote.pauta_id.clone()),
        unit_id: Set(vote.unit_id.clone()),
        user_id: Set(vote.user_id.clone()),
        choice: Set(vote.choice),
        origin: Set(vote.origin),
        ip: Set(vote.ip.clone()),
        user_agent: Set(vote.user_agent.clone()),
        created_at: Set(vote.created_at),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use condovote_db::entities::{assembly, pauta, profile::Role};
    use condovote_db::repositories::AuditLogRepository;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    struct Setup {
        assembly: assembly::Model,
        pauta: pauta::Model,
        present: Option<bool>,
        defaulter: Option<bool>,
        vote_db: Arc<DatabaseConnection>,
        audit_writes: usize,
    }

    impl Setup {
        fn new(assembly_status: AssemblyStatus, pauta_status: PautaStatus) -> Self {
            Self {
                assembly: fixtures::assembly("a1", assembly_status),
                pauta: fixtures::pauta("p1", 0, pauta_status),
                present: None,
                defaulter: None,
                vote_db: fixtures::empty_db(),
                audit_writes: 1,
            }
        }

        fn service(self) -> VoteService {
            let pauta_db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[self.pauta]])
                    .into_connection(),
            );
            let assembly_db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[self.assembly]])
                    .into_connection(),
            );
            let presence_db = match self.present {
                Some(present) => Arc::new(
                    MockDatabase::new(DatabaseBackend::Postgres)
                        .append_query_results([[fixtures::count_row(i64::from(present))]])
                        .into_connection(),
                ),
                None => fixtures::empty_db(),
            };
            let unit_db = match self.defaulter {
                Some(is_defaulter) => Arc::new(
                    MockDatabase::new(DatabaseBackend::Postgres)
                        .append_query_results([[fixtures::unit("101", is_defaulter)]])
                        .into_connection(),
                ),
                None => fixtures::empty_db(),
            };

            VoteService::new(
                VoteRepository::new(self.vote_db),
                PautaRepository::new(pauta_db),
                AssemblyRepository::new(assembly_db),
                PresenceRepository::new(presence_db),
                UnitRepository::new(unit_db),
                AuditService::new(
                    AuditLogRepository::new(fixtures::exec_db(self.audit_writes)),
                    AssemblyRepository::new(fixtures::empty_db()),
                ),
            )
        }
    }

    fn cast_input(choice: &str) -> CastVoteInput {
        CastVoteInput {
            pauta_id: "p1".to_string(),
            choice: choice.to_string(),
            origin: None,
            unit_id: None,
        }
    }

    fn morador() -> Actor {
        fixtures::actor(Role::Morador, Some("101"))
    }

    fn vote_db(rows_affected: u64, existing: Option<vote::Model>) -> Arc<DatabaseConnection> {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([fixtures::exec(rows_affected)]);
        if let Some(existing) = existing {
            db = db.append_query_results([[existing]]);
        }
        Arc::new(db.into_connection())
    }

    #[tokio::test]
    async fn test_cast_on_pending_pauta_is_invalid_state() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Pending).service();

        let result = service
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_cast_state_gating_combinations() {
        let cases = [
            (AssemblyStatus::Scheduled, PautaStatus::Voting),
            (AssemblyStatus::Closed, PautaStatus::Voting),
            (AssemblyStatus::Open, PautaStatus::Closed),
            (AssemblyStatus::Open, PautaStatus::Pending),
        ];

        for (assembly_status, pauta_status) in cases {
            let service = Setup::new(assembly_status, pauta_status).service();
            let result = service
                .cast(&morador(), cast_input("no"), &ClientInfo::default())
                .await;
            assert!(
                matches!(result, Err(AppError::InvalidState(_))),
                "{assembly_status:?}/{pauta_status:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_cast_succeeds_then_second_cast_conflicts() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.vote_db = vote_db(1, None);
        let vote = setup
            .service()
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(vote.choice, VoteChoice::Yes);
        assert_eq!(vote.origin, VoteOrigin::Web);

        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.vote_db = vote_db(0, Some(fixtures::vote("p1", "101", VoteChoice::Yes)));
        let result = setup
            .service()
            .cast(&morador(), cast_input("no"), &ClientInfo::default())
            .await;

        match result {
            Err(AppError::AlreadyVoted {
                existing_choice, ..
            }) => assert_eq!(existing_choice, "yes"),
            other => panic!("expected AlreadyVoted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cast_invalid_choice() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Voting).service();

        let result = service
            .cast(&morador(), cast_input("maybe"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cast_invalid_origin() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Voting).service();
        let mut input = cast_input("yes");
        input.origin = Some("fax".to_string());

        let result = service
            .cast(&morador(), input, &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cast_without_unit_is_forbidden() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Voting).service();
        let unlinked = fixtures::actor(Role::Morador, None);

        let result = service
            .cast(&unlinked, cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cast_for_other_unit_is_forbidden() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Voting).service();
        let mut input = cast_input("yes");
        input.unit_id = Some("202".to_string());

        let result = service
            .cast(&morador(), input, &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cast_requires_presence_when_configured() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.assembly.require_presence = true;
        setup.present = Some(false);

        let result = setup
            .service()
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cast_after_presence_confirmed() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.assembly.require_presence = true;
        setup.present = Some(true);
        setup.vote_db = vote_db(1, None);

        let vote = setup
            .service()
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(vote.unit_id, "101");
    }

    #[tokio::test]
    async fn test_cast_blocks_defaulter() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.assembly.block_defaulters = true;
        setup.defaulter = Some(true);

        let result = setup
            .service()
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_doorman_cannot_vote() {
        let service = Setup::new(AssemblyStatus::Open, PautaStatus::Voting).service();
        let porteiro = fixtures::actor(Role::Porteiro, Some("101"));

        let result = service
            .cast(&porteiro, cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cast_records_client_metadata() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.vote_db = vote_db(1, None);
        let client = ClientInfo {
            ip: Some("203.0.113.7".to_string()),
            user_agent: Some("CondoApp/2.1".to_string()),
        };
        let mut input = cast_input("abstain");
        input.origin = Some("app".to_string());

        let vote = setup.service().cast(&morador(), input, &client).await.unwrap();

        assert_eq!(vote.choice, VoteChoice::Abstain);
        assert_eq!(vote.origin, VoteOrigin::App);
        assert_eq!(vote.ip.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn test_best_effort_audit_failure_keeps_vote() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.vote_db = vote_db(1, None);
        setup.audit_writes = 0;

        let result = setup
            .service()
            .cast(&morador(), cast_input("yes"), &ClientInfo::default())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_atomic_audit_writes_vote_and_entry_together() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        setup.vote_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([fixtures::exec(1), fixtures::exec(1)])
                .into_connection(),
        );
        setup.audit_writes = 0;

        let vote = setup
            .service()
            .with_audit_mode(AuditMode::Atomic)
            .cast(&morador(), cast_input("no"), &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(vote.choice, VoteChoice::No);
    }

    #[tokio::test]
    async fn test_atomic_audit_failure_fails_vote() {
        let mut setup = Setup::new(AssemblyStatus::Open, PautaStatus::Voting);
        // Vote insert succeeds, the audit insert has no result queued.
        setup.vote_db = vote_db(1, None);

        let result = setup
            .service()
            .with_audit_mode(AuditMode::Atomic)
            .cast(&morador(), cast_input("no"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
