//! Pauta state machine: `pending -> voting -> closed`.

use std::collections::HashMap;

use crate::services::access::{Actor, ClientInfo, Permission};
use crate::services::audit::{AuditEntry, AuditService};
use chrono::Utc;
use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::{
    entities::{
        assembly::{self, AssemblyStatus},
        audit_log::AuditEvent,
        pauta::{self, PautaStatus, QuorumType},
        vote::VoteChoice,
    },
    repositories::{AssemblyRepository, PautaRepository, VoteRepository, VotingStart},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Input for creating a pauta.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePautaInput {
    pub assembly_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub quorum_type: QuorumType,
    #[validate(range(min = 1, max = 100))]
    pub quorum_custom: Option<i32>,
}

/// A pauta with the number of votes cast on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PautaWithCount {
    #[serde(flatten)]
    pub pauta: pauta::Model,
    pub vote_count: i64,
}

/// Vote breakdown for a pauta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub yes: i64,
    pub no: i64,
    pub abstain: i64,
    pub total: i64,
}

/// Pauta service for business logic.
#[derive(Clone)]
pub struct PautaService {
    pauta_repo: PautaRepository,
    assembly_repo: AssemblyRepository,
    vote_repo: VoteRepository,
    audit: AuditService,
    id_gen: IdGenerator,
    serialize_voting: bool,
}

impl PautaService {
    /// Create a new pauta service.
    #[must_use]
    pub const fn new(
        pauta_repo: PautaRepository,
        assembly_repo: AssemblyRepository,
        vote_repo: VoteRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            pauta_repo,
            assembly_repo,
            vote_repo,
            audit,
            id_gen: IdGenerator::new(),
            serialize_voting: false,
        }
    }

    /// Allow at most one pauta per assembly in `voting` at a time.
    #[must_use]
    pub const fn with_serialized_voting(mut self, enabled: bool) -> Self {
        self.serialize_voting = enabled;
        self
    }

    /// Create a pauta at the end of its assembly's agenda.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreatePautaInput,
        client: &ClientInfo,
    ) -> AppResult<pauta::Model> {
        input.validate()?;
        actor.require(Permission::ManagePautas)?;

        let assembly = self.assembly_repo.get_by_id(&input.assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        if assembly.status == AssemblyStatus::Closed {
            return Err(AppError::InvalidState(
                "A assembleia já foi encerrada".to_string(),
            ));
        }

        let quorum_custom = match input.quorum_type {
            QuorumType::Simple => None,
            QuorumType::Custom => Some(input.quorum_custom.ok_or_else(|| {
                AppError::Validation("Quórum personalizado exige um valor".to_string())
            })?),
        };

        let order_index = next_order_index(self.pauta_repo.max_order_index(&assembly.id).await?);

        let model = pauta::ActiveModel {
            id: Set(self.id_gen.generate()),
            assembly_id: Set(assembly.id.clone()),
            title: Set(input.title),
            description: Set(input.description),
            quorum_type: Set(input.quorum_type),
            quorum_custom: Set(quorum_custom),
            order_index: Set(order_index),
            status: Set(PautaStatus::Pending),
            created_at: Set(Utc::now().into()),
            opened_at: Set(None),
            closed_at: Set(None),
        };

        let pauta = self.pauta_repo.create(model).await?;

        tracing::info!(pauta_id = %pauta.id, assembly_id = %assembly.id, order_index, "Pauta created");

        self.audit
            .record(
                actor,
                client,
                pauta_entry(&assembly, &pauta, AuditEvent::PautaCreated, json!({
                    "title": pauta.title,
                    "orderIndex": pauta.order_index,
                })),
            )
            .await;

        Ok(pauta)
    }

    /// Open a pending pauta for voting.
    pub async fn open(
        &self,
        actor: &Actor,
        pauta_id: &str,
        client: &ClientInfo,
    ) -> AppResult<pauta::Model> {
        actor.require(Permission::ManagePautas)?;

        let pauta = self.pauta_repo.get_by_id(pauta_id).await?;
        let assembly = self.assembly_repo.get_by_id(&pauta.assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        if assembly.status != AssemblyStatus::Open {
            return Err(AppError::InvalidState(
                "A assembleia não está aberta".to_string(),
            ));
        }
        if pauta.status != PautaStatus::Pending {
            return Err(AppError::InvalidState(
                "Somente pautas pendentes podem ser abertas".to_string(),
            ));
        }

        let pauta = match self
            .pauta_repo
            .start_voting(&pauta.id, &assembly.id, self.serialize_voting)
            .await?
        {
            VotingStart::Started(pauta) => pauta,
            VotingStart::NotPending => {
                return Err(AppError::InvalidState(
                    "Somente pautas pendentes podem ser abertas".to_string(),
                ));
            }
            VotingStart::SiblingVoting => {
                return Err(AppError::InvalidState(
                    "Já existe uma pauta em votação nesta assembleia".to_string(),
                ));
            }
        };

        tracing::info!(pauta_id = %pauta.id, assembly_id = %assembly.id, "Pauta opened for voting");

        self.audit
            .record(
                actor,
                client,
                pauta_entry(&assembly, &pauta, AuditEvent::PautaOpened, json!({})),
            )
            .await;

        Ok(pauta)
    }

    /// Close a pauta that is in voting. Its tally becomes final.
    pub async fn close(
        &self,
        actor: &Actor,
        pauta_id: &str,
        client: &ClientInfo,
    ) -> AppResult<pauta::Model> {
        actor.require(Permission::ManagePautas)?;

        let pauta = self.pauta_repo.get_by_id(pauta_id).await?;
        let assembly = self.assembly_repo.get_by_id(&pauta.assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        if pauta.status != PautaStatus::Voting {
            return Err(AppError::InvalidState(
                "Somente pautas em votação podem ser encerradas".to_string(),
            ));
        }

        let Some(pauta) = self.pauta_repo.finish_voting(&pauta.id).await? else {
            return Err(AppError::InvalidState(
                "Somente pautas em votação podem ser encerradas".to_string(),
            ));
        };

        tracing::info!(pauta_id = %pauta.id, assembly_id = %assembly.id, "Pauta closed");

        self.audit
            .record(
                actor,
                client,
                pauta_entry(&assembly, &pauta, AuditEvent::PautaClosed, json!({})),
            )
            .await;

        Ok(pauta)
    }

    /// List an assembly's pautas in order, each with its vote count.
    pub async fn list(&self, actor: &Actor, assembly_id: &str) -> AppResult<Vec<PautaWithCount>> {
        let assembly = self.assembly_repo.get_by_id(assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        let pautas = self.pauta_repo.find_by_assembly(assembly_id).await?;
        let ids: Vec<String> = pautas.iter().map(|p| p.id.clone()).collect();
        let counts: HashMap<String, i64> = self
            .vote_repo
            .count_by_pautas(&ids)
            .await?
            .into_iter()
            .map(|c| (c.pauta_id, c.count))
            .collect();

        Ok(pautas
            .into_iter()
            .map(|pauta| {
                let vote_count = counts.get(&pauta.id).copied().unwrap_or(0);
                PautaWithCount { pauta, vote_count }
            })
            .collect())
    }

    /// Count a pauta's votes by choice.
    pub async fn tally(&self, actor: &Actor, pauta_id: &str) -> AppResult<Tally> {
        let pauta = self.pauta_repo.get_by_id(pauta_id).await?;
        let assembly = self.assembly_repo.get_by_id(&pauta.assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        let mut tally = Tally::default();
        for row in self.vote_repo.tally(pauta_id).await? {
            match row.choice.parse::<VoteChoice>() {
                Ok(VoteChoice::Yes) => tally.yes += row.count,
                Ok(VoteChoice::No) => tally.no += row.count,
                Ok(VoteChoice::Abstain) => tally.abstain += row.count,
                Err(e) => return Err(AppError::Internal(e)),
            }
            tally.total += row.count;
        }

        Ok(tally)
    }
}

/// Order index following the current maximum, 0 for an empty agenda.
const fn next_order_index(current_max: Option<i32>) -> i32 {
    match current_max {
        Some(max) => max + 1,
        None => 0,
    }
}

pub(crate) fn pauta_entry(
    assembly: &assembly::Model,
    pauta: &pauta::Model,
    event: AuditEvent,
    details: serde_json::Value,
) -> AuditEntry {
    AuditEntry {
        condo_id: assembly.condo_id.clone(),
        assembly_id: Some(assembly.id.clone()),
        event,
        target_type: "pauta",
        target_id: pauta.id.clone(),
        details,
    }
}
