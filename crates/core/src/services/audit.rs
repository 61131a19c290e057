//! Audit trail service.

use crate::services::access::{Actor, ClientInfo, Permission};
use chrono::Utc;
use condovote_common::{AppResult, IdGenerator};
use condovote_db::{
    entities::{audit_log, audit_log::AuditEvent},
    repositories::{AssemblyRepository, AuditLogRepository},
};
use sea_orm::Set;
use serde_json::Value;

/// Maximum number of entries returned per page.
const MAX_PAGE_SIZE: u64 = 500;

/// A governance event about to be appended to the trail.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub condo_id: String,
    pub assembly_id: Option<String>,
    pub event: AuditEvent,
    pub target_type: &'static str,
    pub target_id: String,
    pub details: Value,
}

/// Append-only audit trail.
#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditLogRepository,
    assembly_repo: AssemblyRepository,
    id_gen: IdGenerator,
}

impl AuditService {
    /// Create a new audit service.
    #[must_use]
    pub const fn new(audit_repo: AuditLogRepository, assembly_repo: AssemblyRepository) -> Self {
        Self {
            audit_repo,
            assembly_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Build the row for an entry without writing it.
    #[must_use]
    pub fn build(
        &self,
        actor: &Actor,
        client: &ClientInfo,
        entry: AuditEntry,
    ) -> audit_log::ActiveModel {
        audit_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            condo_id: Set(entry.condo_id),
            assembly_id: Set(entry.assembly_id),
            event_type: Set(entry.event),
            actor_id: Set(actor.user_id.clone()),
            actor_role: Set(actor.role.as_str().to_string()),
            target_type: Set(entry.target_type.to_string()),
            target_id: Set(entry.target_id),
            details: Set(entry.details),
            ip: Set(client.ip.clone()),
            user_agent: Set(client.user_agent.clone()),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Append an entry, failing if the write fails.
    pub async fn append(
        &self,
        actor: &Actor,
        client: &ClientInfo,
        entry: AuditEntry,
    ) -> AppResult<()> {
        self.audit_repo
            .append(self.build(actor, client, entry))
            .await
    }

    /// Append an entry. A failed write is logged and never reaches the caller.
    pub async fn record(&self, actor: &Actor, client: &ClientInfo, entry: AuditEntry) {
        let event = entry.event;
        let target_id = entry.target_id.clone();

        if let Err(e) = self.append(actor, client, entry).await {
            tracing::warn!(
                event = event.as_str(),
                target_id = %target_id,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }

    /// Read an assembly's trail, oldest first.
    pub async fn list_for_assembly(
        &self,
        actor: &Actor,
        assembly_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_log::Model>> {
        actor.require(Permission::ViewAuditLog)?;
        let assembly = self.assembly_repo.get_by_id(assembly_id).await?;
        actor.require_condo(&assembly.condo_id)?;

        self.audit_repo
            .find_by_assembly(assembly_id, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Read a condominium's trail, including entries outside any assembly.
    pub async fn list_for_condo(
        &self,
        actor: &Actor,
        condo_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_log::Model>> {
        actor.require(Permission::ViewAuditLog)?;
        let condo_id = actor.target_condo(condo_id)?;

        self.audit_repo
            .find_by_condo(&condo_id, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }
}
