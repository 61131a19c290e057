//! Role-based access control.
//!
//! The acting user is always derived from their server-side profile. Client
//! supplied role hints are never consulted.

use condovote_common::{AppError, AppResult};
use condovote_db::entities::profile::{self, Role};
use serde::Serialize;

/// Capability checked before a governance operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create, open and close assemblies, attach minutes.
    ManageAssemblies,
    /// Create, open and close pautas.
    ManagePautas,
    /// Confirm presence on behalf of any unit of the condominium.
    RegisterPresence,
    /// Create enquetes.
    ManageEnquetes,
    /// Read the audit trail.
    ViewAuditLog,
    /// Vote on pautas and enquetes for one's own unit.
    CastVote,
}

const ADMIN: &[Permission] = &[
    Permission::ManageAssemblies,
    Permission::ManagePautas,
    Permission::RegisterPresence,
    Permission::ManageEnquetes,
    Permission::ViewAuditLog,
    Permission::CastVote,
];

const RESIDENT: &[Permission] = &[Permission::CastVote];

const DOORMAN: &[Permission] = &[Permission::RegisterPresence];

/// Permissions granted to a role.
#[must_use]
pub const fn permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Sindico | Role::Subsindico | Role::Superadmin => ADMIN,
        Role::Porteiro => DOORMAN,
        Role::Morador => RESIDENT,
    }
}

/// Whether `role` holds `permission`.
#[must_use]
pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions(role).contains(&permission)
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub condo_id: String,
    pub unit_id: Option<String>,
}

impl From<&profile::Model> for Actor {
    fn from(profile: &profile::Model) -> Self {
        Self {
            user_id: profile.id.clone(),
            role: profile.role,
            condo_id: profile.condo_id.clone(),
            unit_id: profile.unit_id.clone(),
        }
    }
}

impl Actor {
    /// Whether the actor holds `permission`.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        has_permission(self.role, permission)
    }

    /// Reject unless the actor holds `permission`.
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Você não tem permissão para esta operação".to_string(),
            ))
        }
    }

    /// Reject access to another condominium's data. Superadmins cross condominiums.
    pub fn require_condo(&self, condo_id: &str) -> AppResult<()> {
        if self.role == Role::Superadmin || self.condo_id == condo_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Acesso negado a este condomínio".to_string(),
            ))
        }
    }

    /// Resolve the unit an operation acts for and require the actor to belong to it.
    ///
    /// `None` means the actor's own unit.
    pub fn own_unit(&self, requested: Option<&str>) -> AppResult<String> {
        let own = self.unit_id.as_deref().ok_or_else(|| {
            AppError::Forbidden("Você não está vinculado a nenhuma unidade".to_string())
        })?;

        match requested {
            Some(unit_id) if unit_id != own => Err(AppError::Forbidden(
                "Você só pode agir em nome da sua própria unidade".to_string(),
            )),
            _ => Ok(own.to_string()),
        }
    }

    /// Condominium targeted by an operation, defaulting to the actor's own.
    pub fn target_condo(&self, requested: Option<&str>) -> AppResult<String> {
        let condo_id = requested.unwrap_or(&self.condo_id);
        self.require_condo(condo_id)?;
        Ok(condo_id.to_string())
    }
}

/// Request metadata recorded alongside votes and audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
