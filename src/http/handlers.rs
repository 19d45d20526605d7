use super::state::AppState;
use crate::profile::OutputFormat;
use crate::session::StartRequest;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Output format name; unrecognized or missing values fall back to mp3
    pub format: Option<String>,

    /// Absolute path of the output file
    pub path: PathBuf,

    /// Selects the wideband AMR variant (and 16 kHz sampling)
    #[serde(default)]
    pub high_quality: bool,

    /// Maximum output size in bytes; -1 = unlimited
    #[serde(default = "unlimited")]
    pub max_file_size: i64,
}

fn unlimited() -> i64 {
    -1
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn accepted() -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(CommandResponse {
            status: "accepted".to_string(),
        }),
    )
}

fn controller_gone(e: anyhow::Error) -> axum::response::Response {
    error!("failed to queue command: {:#}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "session controller is unavailable".to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recorder/start
/// Queue a recording start. Failures surface as events, not here.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let format = req
        .format
        .as_deref()
        .map(OutputFormat::parse_lossy)
        .unwrap_or(OutputFormat::Mp3);

    info!("start requested: {} ({:?})", req.path.display(), format);

    let start = StartRequest {
        format,
        path: req.path,
        high_quality: req.high_quality,
        max_file_size: req.max_file_size,
    };

    match state.handle.start(start).await {
        Ok(()) => accepted().into_response(),
        Err(e) => controller_gone(e),
    }
}

/// POST /recorder/stop
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("stop requested");
    match state.handle.stop().await {
        Ok(()) => accepted().into_response(),
        Err(e) => controller_gone(e),
    }
}

/// POST /recorder/monitor/enable
pub async fn enable_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.enable_monitoring().await {
        Ok(()) => accepted().into_response(),
        Err(e) => controller_gone(e),
    }
}

/// POST /recorder/monitor/disable
pub async fn disable_monitoring(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.disable_monitoring().await {
        Ok(()) => accepted().into_response(),
        Err(e) => controller_gone(e),
    }
}

/// GET /recorder/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.handle.status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => controller_gone(e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
