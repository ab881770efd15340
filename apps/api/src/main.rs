mod auth;
mod config;
mod errors;
mod generation;
mod jobs;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::cover::CoverRenderer;
use crate::jobs::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting covergen v{}", env!("CARGO_PKG_VERSION"));

    // A broken template override should stop startup, not every request.
    let renderer = CoverRenderer::load(config.cover_template_path.as_deref())?;
    info!(
        "Cover template ready ({})",
        config
            .cover_template_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "bundled".to_string())
    );

    info!(
        "Sessions expire after {}s idle, at most {} live",
        config.session_ttl.as_secs(),
        config.max_sessions
    );

    if config.app_password.is_some() {
        info!("Password gate enabled");
    }

    let state = AppState {
        config: config.clone(),
        sessions: SessionStore::new(config.session_ttl, config.max_sessions),
        renderer: Arc::new(renderer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
