//! Presence ledger.

use crate::services::access::{Actor, ClientInfo, Permission};
use crate::services::audit::{AuditEntry, AuditService};
use chrono::Utc;
use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::{
    entities::{assembly::AssemblyStatus, audit_log::AuditEvent, presence},
    repositories::{AssemblyRepository, PresenceRepository, UnitRepository},
};
use sea_orm::Set;
use serde::Serialize;
use serde_json::json;

/// Result of a presence confirmation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceConfirmation {
    pub presence: presence::Model,
    /// False when the unit had already been confirmed.
    pub newly_confirmed: bool,
}

/// Presence service for business logic.
#[derive(Clone)]
pub struct PresenceService {
    presence_repo: PresenceRepository,
    assembly_repo: AssemblyRepository,
    unit_repo: UnitRepository,
    audit: AuditService,
    id_gen: IdGenerator,
}

impl PresenceService {
    /// Create a new presence service.
    #[must_use]
    pub const fn new(
        presence_repo: PresenceRepository,
        assembly_repo: AssemblyRepository,
        unit_repo: UnitRepository,
        audit: AuditService,
    ) -> Self {
        Self {
            presence_repo,
            assembly_repo,
            unit_repo,
            audit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Confirm a unit's presence. Confirming again is a no-op.
    ///
    /// Residents confirm their own unit. Staff holding
    /// [`Permission::RegisterPresence`] may confirm any unit of the condominium.
    pub async fn confirm(
        &self,
        actor: &Actor,
        assembly_id: &str,
        unit_id: Option<&str>,
        client: &ClientInfo,
    ) -> AppResult<PresenceConfirmation> {
        let assembly = self.assembly_repo.get_by_id(assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        if assembly.status == AssemblyStatus::Closed {
            return Err(AppError::InvalidState(
                "A assembleia já foi encerrada".to_string(),
            ));
        }

        let unit_id = match unit_id {
            Some(unit_id) if actor.unit_id.as_deref() != Some(unit_id) => {
                actor.require(Permission::RegisterPresence)?;
                let unit = self.unit_repo.get_by_id(unit_id).await?;
                if unit.condo_id != assembly.condo_id {
                    return Err(AppError::NotFound(format!(
                        "Unidade não encontrada: {unit_id}"
                    )));
                }
                unit.id
            }
            requested => actor.own_unit(requested)?,
        };

        if let Some(existing) = self.presence_repo.find(assembly_id, &unit_id).await? {
            return Ok(PresenceConfirmation {
                presence: existing,
                newly_confirmed: false,
            });
        }

        let presence = presence::Model {
            id: self.id_gen.generate(),
            assembly_id: assembly_id.to_string(),
            unit_id: unit_id.clone(),
            confirmed_by: actor.user_id.clone(),
            confirmed_at: Utc::now().into(),
        };

        let inserted = self
            .presence_repo
            .insert_if_absent(presence::ActiveModel {
                id: Set(presence.id.clone()),
                assembly_id: Set(presence.assembly_id.clone()),
                unit_id: Set(presence.unit_id.clone()),
                confirmed_by: Set(presence.confirmed_by.clone()),
                confirmed_at: Set(presence.confirmed_at),
            })
            .await?;

        if !inserted {
            // A concurrent confirmation won the race.
            let existing = self
                .presence_repo
                .find(assembly_id, &unit_id)
                .await?
                .ok_or_else(|| AppError::Internal("Presence row vanished".to_string()))?;
            return Ok(PresenceConfirmation {
                presence: existing,
                newly_confirmed: false,
            });
        }

        tracing::info!(assembly_id = %assembly_id, unit_id = %unit_id, "Presence confirmed");

        self.audit
            .record(
                actor,
                client,
                AuditEntry {
                    condo_id: assembly.condo_id,
                    assembly_id: Some(assembly.id),
                    event: AuditEvent::PresenceConfirmed,
                    target_type: "unit",
                    target_id: unit_id,
                    details: json!({ "confirmedBy": actor.user_id }),
                },
            )
            .await;

        Ok(PresenceConfirmation {
            presence,
            newly_confirmed: true,
        })
    }

    /// Whether a unit is present at an assembly.
    pub async fn is_present(&self, assembly_id: &str, unit_id: &str) -> AppResult<bool> {
        self.presence_repo.exists(assembly_id, unit_id).await
    }

    /// Presence records of an assembly.
    pub async fn list(&self, actor: &Actor, assembly_id: &str) -> AppResult<Vec<presence::Model>> {
        actor.require(Permission::RegisterPresence)?;
        let assembly = self.assembly_repo.get_by_id(assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        self.presence_repo.find_by_assembly(assembly_id).await
    }
}
