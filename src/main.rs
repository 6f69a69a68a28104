mod agent;
mod catalog;
mod config;
mod errors;
mod models;
mod routes;
mod service;
mod session;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::SimulatedTutor;
use crate::catalog::note_catalog::NoteCatalog;
use crate::catalog::subject_catalog::SubjectCatalog;
use crate::config::AppConfig;
use crate::service::session_service::SessionService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_tutor=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(
        reply_delay_ms = config.reply_delay.as_millis() as u64,
        max_message_length = config.max_message_length,
        session_idle_ttl_secs = config.session_idle_ttl.as_secs(),
        "Configuration loaded"
    );

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let tutor = SimulatedTutor::new(config.reply_delay);
    let sessions = SessionService::new(&config, SubjectCatalog::new(), NoteCatalog::new(), tutor);
    let _reaper = sessions.spawn_reaper();

    // ── Router ────────────────────────────────────────────────────────────────
    let app = routes::router(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
