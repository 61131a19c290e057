//! Assembly endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use condovote_common::AppResult;
use condovote_core::CreateAssemblyInput;
use condovote_db::entities::assembly;
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
        .route("/attach-minutes", post(attach_minutes))
        .route("/show", get(show))
        .route("/list", get(list))
}

/// Request naming a single assembly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyIdRequest {
    pub assembly_id: String,
}

/// Attach minutes request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachMinutesRequest {
    pub assembly_id: String,
    pub minutes_url: String,
}

/// List assemblies query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssembliesQuery {
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
    Json(input): Json<CreateAssemblyInput>,
) -> AppResult<ApiResponse<assembly::Model>> {
    let assembly = state
        .assembly_service
        .create(&user.actor(), input, &client)
        .await?;
    Ok(ApiResponse::ok(assembly))
}

async fn open(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<AssemblyIdRequest>,
) -> AppResult<ApiResponse<assembly::Model>> {
    let assembly = state
        .assembly_service
        .open(&user.actor(), &req.assembly_id, &client)
        .await?;
    Ok(ApiResponse::ok(assembly))
}

/// Close an assembly. Pautas still in voting close with it.
async fn close(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<AssemblyIdRequest>,
) -> AppResult<ApiResponse<assembly::Model>> {
    let assembly = state
        .assembly_service
        .close(&user.actor(), &req.assembly_id, &client)
        .await?;
    Ok(ApiResponse::ok(assembly))
}

async fn attach_minutes(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(req): Json<AttachMinutesRequest>,
) -> AppResult<ApiResponse<assembly::Model>> {
    let assembly = state
        .assembly_service
        .attach_minutes(&user.actor(), &req.assembly_id, &req.minutes_url, &client)
        .await?;
    Ok(ApiResponse::ok(assembly))
}

async fn show(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AssemblyIdRequest>,
) -> AppResult<ApiResponse<assembly::Model>> {
    let assembly = state
        .assembly_service
        .get(&user.actor(), &query.assembly_id)
        .await?;
    Ok(ApiResponse::ok(assembly))
}

async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListAssembliesQuery>,
) -> AppResult<ApiResponse<Vec<assembly::Model>>> {
    let assemblies = state
        .assembly_service
        .list(
            &user.actor(),
            query.condo_id.as_deref(),
            query.limit,
            query.offset,
        )
        .await?;
    Ok(ApiResponse::ok(assemblies))
}
