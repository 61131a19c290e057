//! Assembly lifecycle: `scheduled -> open -> closed`.

use crate::services::access::{Actor, ClientInfo, Permission};
use crate::services::audit::{AuditEntry, AuditService};
use crate::services::pauta::pauta_entry;
use chrono::{DateTime, Utc};
use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::{
    entities::{
        assembly::{self, AssemblyStatus},
        audit_log::AuditEvent,
    },
    repositories::{AssemblyRepository, PautaRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Maximum number of assemblies returned per page.
const MAX_PAGE_SIZE: u64 = 100;

/// Input for creating an assembly.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssemblyInput {
    /// Defaults to the actor's condominium.
    pub condo_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 2048))]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub require_presence: bool,
    #[serde(default)]
    pub block_defaulters: bool,
}

/// Assembly service for business logic.
#[derive(Clone)]
pub struct AssemblyService {
    assembly_repo: AssemblyRepository,
    pauta_repo: PautaRepository,
    audit: AuditService,
    id_gen: IdGenerator,
}

impl AssemblyService {
    /// Create a new assembly service.
    #[must_use]
    pub const fn new(
        assembly_repo: AssemblyRepository,
        pauta_repo: PautaRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            assembly_repo,
            pauta_repo,
            audit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Schedule a new assembly.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateAssemblyInput,
        client: &ClientInfo,
    ) -> AppResult<assembly::Model> {
        input.validate()?;
        actor.require(Permission::ManageAssemblies)?;
        let condo_id = actor.target_condo(input.condo_id.as_deref())?;

        let model = assembly::ActiveModel {
            id: Set(self.id_gen.generate()),
            condo_id: Set(condo_id),
            title: Set(input.title),
            description: Set(input.description),
            scheduled_at: Set(input.scheduled_at.into()),
            meeting_link: Set(input.meeting_link),
            require_presence: Set(input.require_presence),
            block_defaulters: Set(input.block_defaulters),
            status: Set(AssemblyStatus::Scheduled),
            minutes_url: Set(None),
            created_by: Set(actor.user_id.clone()),
            created_at: Set(Utc::now().into()),
            opened_at: Set(None),
            closed_at: Set(None),
        };

        let assembly = self.assembly_repo.create(model).await?;

        tracing::info!(assembly_id = %assembly.id, condo_id = %assembly.condo_id, "Assembly created");

        self.audit
            .record(
                actor,
                client,
                assembly_entry(&assembly, AuditEvent::AssemblyCreated, json!({
                    "title": assembly.title,
                    "requirePresence": assembly.require_presence,
                    "blockDefaulters": assembly.block_defaulters,
                })),
            )
            .await;

        Ok(assembly)
    }

    /// Get an assembly visible to the actor.
    pub async fn get(&self, actor: &Actor, id: &str) -> AppResult<assembly::Model> {
        let assembly = self.assembly_repo.get_by_id(id).await?;
        actor.require_condo(&assembly.condo_id)?;
        Ok(assembly)
    }

    /// List a condominium's assemblies.
    pub async fn list(
        &self,
        actor: &Actor,
        condo_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<assembly::Model>> {
        let condo_id = actor.target_condo(condo_id)?;
        self.assembly_repo
            .find_by_condo(&condo_id, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Open a scheduled assembly.
    pub async fn open(
        &self,
        actor: &Actor,
        id: &str,
        client: &ClientInfo,
    ) -> AppResult<assembly::Model> {
        actor.require(Permission::ManageAssemblies)?;
        let assembly = self.get(actor, id).await?;

        if assembly.status != AssemblyStatus::Scheduled {
            return Err(AppError::InvalidState(
                "Somente assembleias agendadas podem ser abertas".to_string(),
            ));
        }

        let Some(assembly) = self
            .assembly_repo
            .transition(&assembly.id, AssemblyStatus::Scheduled, AssemblyStatus::Open)
            .await?
        else {
            return Err(AppError::InvalidState(
                "Somente assembleias agendadas podem ser abertas".to_string(),
            ));
        };

        tracing::info!(assembly_id = %assembly.id, "Assembly opened");

        self.audit
            .record(
                actor,
                client,
                assembly_entry(&assembly, AuditEvent::AssemblyOpened, json!({})),
            )
            .await;

        Ok(assembly)
    }

    /// Close an open assembly. Every pauta still in voting is closed with it.
    pub async fn close(
        &self,
        actor: &Actor,
        id: &str,
        client: &ClientInfo,
    ) -> AppResult<assembly::Model> {
        actor.require(Permission::ManageAssemblies)?;
        let assembly = self.get(actor, id).await?;

        if assembly.status != AssemblyStatus::Open {
            return Err(AppError::InvalidState(
                "Somente assembleias abertas podem ser encerradas".to_string(),
            ));
        }

        let Some(assembly) = self
            .assembly_repo
            .transition(&assembly.id, AssemblyStatus::Open, AssemblyStatus::Closed)
            .await?
        else {
            return Err(AppError::InvalidState(
                "Somente assembleias abertas podem ser encerradas".to_string(),
            ));
        };

        for voting in self.pauta_repo.find_voting_by_assembly(&assembly.id).await? {
            // Closed concurrently by a direct pauta close, which wrote its own entry.
            let Some(pauta) = self.pauta_repo.finish_voting(&voting.id).await? else {
                continue;
            };
            tracing::info!(pauta_id = %pauta.id, assembly_id = %assembly.id, "Pauta closed with assembly");
            self.audit
                .record(
                    actor,
                    client,
                    pauta_entry(&assembly, &pauta, AuditEvent::PautaClosed, json!({
                        "cascade": true,
                    })),
                )
                .await;
        }

        tracing::info!(assembly_id = %assembly.id, "Assembly closed");

        self.audit
            .record(
                actor,
                client,
                assembly_entry(&assembly, AuditEvent::AssemblyClosed, json!({})),
            )
            .await;

        Ok(assembly)
    }

    /// Attach the minutes document to a closed assembly.
    pub async fn attach_minutes(
        &self,
        actor: &Actor,
        id: &str,
        minutes_url: &str,
        client: &ClientInfo,
    ) -> AppResult<assembly::Model> {
        actor.require(Permission::ManageAssemblies)?;

        let minutes_url = minutes_url.trim();
        if minutes_url.is_empty() || minutes_url.len() > 2048 {
            return Err(AppError::Validation("Link da ata inválido".to_string()));
        }

        let assembly = self.get(actor, id).await?;
        if assembly.status != AssemblyStatus::Closed {
            return Err(AppError::InvalidState(
                "A ata só pode ser anexada após o encerramento".to_string(),
            ));
        }

        let mut active: assembly::ActiveModel = assembly.into();
        active.minutes_url = Set(Some(minutes_url.to_string()));
        let assembly = self.assembly_repo.update(active).await?;

        self.audit
            .record(
                actor,
                client,
                assembly_entry(&assembly, AuditEvent::MinutesAttached, json!({
                    "minutesUrl": minutes_url,
                })),
            )
            .await;

        Ok(assembly)
    }
}

fn assembly_entry(
    assembly: &assembly::Model,
    event: AuditEvent,
    details: serde_json::Value,
) -> AuditEntry {
    AuditEntry {
        condo_id: assembly.condo_id.clone(),
        assembly_id: Some(assembly.id.clone()),
        event,
        target_type: "assembly",
        target_id: assembly.id.clone(),
        details,
    }
}
