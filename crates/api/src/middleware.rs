//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use condovote_core::{
    AssemblyService, AuditService, EnqueteService, PautaService, PresenceService, SessionService,
    VoteService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub assembly_service: AssemblyService,
    pub pauta_service: PautaService,
    pub vote_service: VoteService,
    pub presence_service: PresenceService,
    pub audit_service: AuditService,
    pub enquete_service: EnqueteService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a profile and stores it in the
/// request extensions. Requests without a valid token pass through unchanged;
/// protected handlers reject them through [`crate::extractors::AuthUser`].
/// A storage failure during the lookup ends the request with its server error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.session_service.authenticate(token.trim()).await {
            Ok(profile) => {
                req.extensions_mut().insert(profile);
            }
            // A lookup that failed is not a bad token.
            Err(e) if e.is_server_error() => return e.into_response(),
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected");
            }
        }
    }

    next.run(req).await
}
