//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, FixedOffset};
use condovote_common::AppResult;
use condovote_core::CastVoteInput;
use condovote_db::entities::vote::{self, VoteChoice};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, Client},
    middleware::AppState,
    response::ApiResponse,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cast", post(cast))
}

/// Cast vote response.
#[derive(Serialize)]
pub struct CastVoteResponse {
    pub status: &'static str,
    pub vote: VoteSummary,
}

/// The recorded vote. Voter metadata stays server-side.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub id: String,
    pub choice: VoteChoice,
    pub created_at: DateTime<FixedOffset>,
}

impl From<vote::Model> for VoteSummary {
    fn from(vote: vote::Model) -> Self {
        Self {
            id: vote.id,
            choice: vote.choice,
            created_at: vote.created_at,
        }
    }
}

/// Cast the caller's unit vote on a pauta.
///
/// A second vote from the same unit answers 409 with the choice already
/// recorded in `existing_choice`.
async fn cast(
    user: AuthUser,
    Client(client): Client,
    State(state): State<AppState>,
    Json(input): Json<CastVoteInput>,
) -> AppResult<ApiResponse<CastVoteResponse>> {
    let vote = state
        .vote_service
        .cast(&user.actor(), input, &client)
        .await?;

    Ok(ApiResponse::ok(CastVoteResponse {
        status: "voted",
        vote: vote.into(),
    }))
}
