//! Enquete (poll) endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use condovote_common::AppResult;
use condovote_core::{CreateEnqueteInput, EnqueteResults, EnqueteWithOptions};
use condovote_db::entities::{enquete, enquete_vote};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, Client},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/vote", post(vote))
        .route("/show", get(show))
        .route("/list", get(list))
        .route("/results", get(results))
}

/// Request naming a single enquete.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueteIdRequest {
    pub enquete_id: String,
}

/// Enquete vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueteVoteRequest {
    pub enquete_id: String,
    pub option_id: String,
    pub unit_id: Option<String>,
}

/// List enquetes query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnquetesQuery {
    pub condo_id: Option<String>,
    #[serde(default = "super::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

async fn create(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(input): Json<CreateEnqueteInput>,
) -> AppResult<ApiResponse<EnqueteWithOptions>> {
    let enquete = state
        .enquete_service
        .create(&user.actor(), input, &client)
        .await?;
    Ok(ApiResponse::ok(enquete))
}

async fn vote(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<EnqueteVoteRequest>,
) -> AppResult<ApiResponse<enquete_vote::Model>> {
    let vote = state
        .enquete_service
        .vote(
            &user.actor(),
            &req.enquete_id,
            &req.option_id,
            req.unit_id.as_deref(),
            &client,
        )
        .await?;
    Ok(ApiResponse::ok(vote))
}

async fn show(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EnqueteIdRequest>,
) -> AppResult<ApiResponse<EnqueteWithOptions>> {
    let enquete = state
        .enquete_service
        .get(&user.actor(), &query.enquete_id)
        .await?;
    Ok(ApiResponse::ok(enquete))
}

async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListEnquetesQuery>,
) -> AppResult<ApiResponse<Vec<enquete::Model>>> {
    let enquetes = state
        .enquete_service
        .list(
            &user.actor(),
            query.condo_id.as_deref(),
            query.limit,
            query.offset,
        )
        .await?;
    Ok(ApiResponse::ok(enquetes))
}

async fn results(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EnqueteIdRequest>,
) -> AppResult<ApiResponse<EnqueteResults>> {
    let results = state
        .enquete_service
        .results(&user.actor(), &query.enquete_id)
        .await?;
    Ok(ApiResponse::ok(results))
}
