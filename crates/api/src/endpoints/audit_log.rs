//! Audit trail endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use condovote_common::AppResult;
use condovote_db::entities::audit_log;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

/// Audit log query. Without `assemblyId` the whole condominium trail is listed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub assembly_id: Option<String>,
    pub condo_id: Option<String>,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> AppResult<ApiResponse<Vec<audit_log::Model>>> {
    let actor = user.actor();
    let entries = match query.assembly_id.as_deref() {
        Some(assembly_id) => {
            state
                .audit_service
                .list_for_assembly(&actor, assembly_id, query.limit, query.offset)
                .await?
        }
        None => {
            state
                .audit_service
                .list_for_condo(&actor, query.condo_id.as_deref(), query.limit, query.offset)
                .await?
        }
    };
    Ok(ApiResponse::ok(entries))
}
