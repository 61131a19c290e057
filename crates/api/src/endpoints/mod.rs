//! API endpoints.

mod assemblies;
mod audit_log;
mod enquetes;
mod health;
mod pautas;
mod presence;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Page size used by list endpoints when `limit` is omitted.
const fn default_limit() -> u64 {
    20
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/assemblies", assemblies::router())
        .nest("/pautas", pautas::router())
        .nest("/votes", votes::router())
        .nest("/presence", presence::router())
        .nest("/audit-log", audit_log::router())
        .nest("/enquetes", enquetes::router())
}
