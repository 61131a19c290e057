//! Presence endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use condovote_common::AppResult;
use condovote_db::entities::presence;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, Client},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/confirm", post(confirm))
        .route("/list", get(list))
}

/// Confirm presence request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPresenceRequest {
    #[serde(alias = "assembly_id")]
    pub assembly_id: String,
    /// Staff registering another unit in person.
    #[serde(alias = "unit_id")]
    pub unit_id: Option<String>,
}

/// Confirm presence response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPresenceResponse {
    pub status: &'static str,
    pub newly_confirmed: bool,
    pub presence: presence::Model,
}

/// List presences query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPresenceQuery {
    pub assembly_id: String,
}

/// Confirm a unit's presence. Repeating the call returns the same confirmation.
async fn confirm(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<ConfirmPresenceRequest>,
) -> AppResult<ApiResponse<ConfirmPresenceResponse>> {
    let confirmation = state
        .presence_service
        .confirm(
            &user.actor(),
            &req.assembly_id,
            req.unit_id.as_deref(),
            &client,
        )
        .await?;

    Ok(ApiResponse::ok(ConfirmPresenceResponse {
        status: "confirmed",
        newly_confirmed: confirmation.newly_confirmed,
        presence: confirmation.presence,
    }))
}

async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPresenceQuery>,
) -> AppResult<ApiResponse<Vec<presence::Model>>> {
    let presences = state
        .presence_service
        .list(&user.actor(), &query.assembly_id)
        .await?;
    Ok(ApiResponse::ok(presences))
}
