//! Coderunner - Application Entry Point
//!
//! This is the main entry point for the Coderunner server.

use std::{net::SocketAddr, sync::Arc};

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coderunner::{
    config::CONFIG,
    constants::{API_BASE_PATH, MAX_REQUEST_BODY_SIZE},
    handlers,
    middleware::logging_middleware,
    sandbox::{DockerEngine, Sandbox},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CONFIG.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coderunner server...");

    // Initialize Docker client
    tracing::info!(socket = %CONFIG.docker.socket_path, "Connecting to Docker...");
    let engine = DockerEngine::connect(&CONFIG.docker)?;

    // An unreachable daemon is not fatal: requests get 503 until it is back
    match engine.version().await {
        Ok(version) => tracing::info!("Connected to Docker version: {}", version),
        Err(e) => tracing::warn!(error = %e, "Docker is not reachable; executions will be refused"),
    }

    tokio::fs::create_dir_all(&CONFIG.sandbox.workspace_root).await?;
    tracing::info!(
        workspace_root = %CONFIG.sandbox.workspace_root.display(),
        max_concurrent = CONFIG.sandbox.max_concurrent_executions,
        "Sandbox ready"
    );

    // Create application state
    let sandbox = Sandbox::new(Arc::new(engine), CONFIG.sandbox.clone());
    let state = AppState::new(sandbox, CONFIG.clone());

    // Build the router
    let app = Router::new()
        .nest(API_BASE_PATH, handlers::routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(CONFIG.server.host.parse()?, CONFIG.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining in-flight executions");
}
