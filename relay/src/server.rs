//! HTTP server for the command relay
//!
//! Routes:
//! - `POST /run` - authenticated command execution
//! - `GET /health` - liveness probe, no auth

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::params::{HealthResponse, RunRequest, RunResponse};
use crate::relay::CommandRelay;
use crate::types::{RelayConfig, RelayError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<CommandRelay>,
    pub expose_exit_code: bool,
}

impl AppState {
    pub fn new(relay: CommandRelay, expose_exit_code: bool) -> Self {
        Self {
            relay: Arc::new(relay),
            expose_exit_code,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(CommandRelay::from_config(config), config.expose_exit_code)
    }
}

/// Start the relay and serve until Ctrl-C or SIGTERM
pub async fn serve(config: RelayConfig) -> Result<()> {
    config.validate()?;

    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        allowed_sudo = config.allowed_sudo.len(),
        shell = %config.shell,
        timeout_secs = ?config.timeout_secs,
        "Starting command relay on http://{}",
        addr
    );

    let app = create_router(AppState::from_config(&config));
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relay shut down");
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/run", post(run_command))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Execute a command
///
/// The token is checked before the body is inspected, so an unauthenticated
/// caller always gets 401 regardless of what they sent.
pub async fn run_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, RelayError> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    state.relay.authorize(auth)?;

    let Json(request) = body.map_err(|rejection| RelayError::InvalidBody(rejection.body_text()))?;

    let result = state.relay.run(&request.cmd).await?;
    Ok(Json(RunResponse::from_result(result, state.expose_exit_code)))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
