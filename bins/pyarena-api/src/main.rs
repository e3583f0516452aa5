mod handlers;
mod routes;

use anyhow::Context;
use axum::Router;
use pyarena_engine::{ChallengeRegistry, EngineConfig, Grader};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub grader: Grader,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Pyarena API booting...");

    let challenges_path = std::env::var("PYARENA_CHALLENGES")
        .unwrap_or_else(|_| "config/challenges.json".to_string());
    let registry = ChallengeRegistry::load(&challenges_path)
        .with_context(|| format!("Failed to load challenges from {}", challenges_path))?;
    info!(
        challenges = registry.len(),
        path = %challenges_path,
        "Challenge registry loaded"
    );

    let config = EngineConfig::from_env();
    info!(
        interpreters = ?config.interpreter_candidates,
        timeout_ms = config.timeout_ms,
        max_source_chars = config.max_source_chars,
        "Engine configured"
    );

    let state = Arc::new(AppState {
        grader: Grader::new(registry, config),
    });

    let app = Router::new().merge(routes::routes()).with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("HTTP server listening on {}", addr);
    info!("Ready to grade submissions");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
