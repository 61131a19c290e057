//! Pauta (agenda item) endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use condovote_common::AppResult;
use condovote_core::{CreatePautaInput, PautaWithCount, Tally};
use condovote_db::entities::pauta;
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, Client},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/open", post(open))
        .route("/close", post(close))
        .route("/list", get(list))
        .route("/tally", get(tally))
}

/// Request naming a single pauta.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PautaIdRequest {
    pub pauta_id: String,
}

/// List pautas query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPautasQuery {
    pub assembly_id: String,
}

async fn create(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(input): Json<CreatePautaInput>,
) -> AppResult<ApiResponse<pauta::Model>> {
    let pauta = state
        .pauta_service
        .create(&user.actor(), input, &client)
        .await?;
    Ok(ApiResponse::ok(pauta))
}

async fn open(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<PautaIdRequest>,
) -> AppResult<ApiResponse<pauta::Model>> {
    let pauta = state
        .pauta_service
        .open(&user.actor(), &req.pauta_id, &client)
        .await?;
    Ok(ApiResponse::ok(pauta))
}

async fn close(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<PautaIdRequest>,
) -> AppResult<ApiResponse<pauta::Model>> {
    let pauta = state
        .pauta_service
        .close(&user.actor(), &req.pauta_id, &client)
        .await?;
    Ok(ApiResponse::ok(pauta))
}

/// The assembly's agenda in order, with vote counts.
async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPautasQuery>,
) -> AppResult<ApiResponse<Vec<PautaWithCount>>> {
    let pautas = state
        .pauta_service
        .list(&user.actor(), &query.assembly_id)
        .await?;
    Ok(ApiResponse::ok(pautas))
}

async fn tally(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PautaIdRequest>,
) -> AppResult<ApiResponse<Tally>> {
    let tally = state
        .pauta_service
        .tally(&user.actor(), &query.pauta_id)
        .await?;
    Ok(ApiResponse::ok(tally))
}
