//! Condovote server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use condovote_api::{AppState, middleware::auth_middleware, router as api_router};
use condovote_common::Config;
use condovote_core::{
    AssemblyService, AuditService, EnqueteService, PautaService, PresenceService, SessionService,
    VoteService,
};
use condovote_db::repositories::{
    AssemblyRepository, AuditLogRepository, EnqueteRepository, PautaRepository,
    PresenceRepository, ProfileRepository, UnitRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Tracing with an env filter. `CONDOVOTE_LOG_FORMAT=json` selects JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "condovote=debug,tower_http=debug".into());
    let json = std::env::var("CONDOVOTE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting condovote server...");

    let config = Config::load()?;

    let db = condovote_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    condovote_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let unit_repo = UnitRepository::new(Arc::clone(&db));
    let assembly_repo = AssemblyRepository::new(Arc::clone(&db));
    let pauta_repo = PautaRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let presence_repo = PresenceRepository::new(Arc::clone(&db));
    let audit_log_repo = AuditLogRepository::new(Arc::clone(&db));
    let enquete_repo = EnqueteRepository::new(Arc::clone(&db));

    // Initialize services
    let governance = &config.governance;
    info!(
        audit_mode = ?governance.audit_mode,
        serialize_pauta_voting = governance.serialize_pauta_voting,
        "Governance settings"
    );

    let audit_service = AuditService::new(audit_log_repo, assembly_repo.clone());
    let state = AppState {
        session_service: SessionService::new(profile_repo),
        assembly_service: AssemblyService::new(
            assembly_repo.clone(),
            pauta_repo.clone(),
            audit_service.clone(),
        ),
        pauta_service: PautaService::new(
            pauta_repo.clone(),
            assembly_repo.clone(),
            vote_repo.clone(),
            audit_service.clone(),
        )
        .with_serialized_voting(governance.serialize_pauta_voting),
        vote_service: VoteService::new(
            vote_repo,
            pauta_repo,
            assembly_repo.clone(),
            presence_repo.clone(),
            unit_repo.clone(),
            audit_service.clone(),
        )
        .with_audit_mode(governance.audit_mode),
        presence_service: PresenceService::new(
            presence_repo,
            assembly_repo,
            unit_repo,
            audit_service.clone(),
        ),
        enquete_service: EnqueteService::new(enquete_repo, audit_service.clone()),
        audit_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let host = config.server.host.parse::<std::net::IpAddr>()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
