//! Refresh API routes
//!
//! - `POST /api/v1/refresh` - start loading the configured CSV file
//! - `GET /api/v1/refresh/status` - progress of the current or last run

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;

use super::commands::{StartRefreshCommand, StartRefreshError};
use super::queries::GetRefreshStatusQuery;
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::ingest::IngestionCoordinator;

#[derive(Clone)]
pub struct RefreshState {
    pub coordinator: IngestionCoordinator,
    pub csv_path: PathBuf,
}

pub fn refresh_routes() -> Router<RefreshState> {
    Router::new()
        .route("/", post(start_refresh))
        .route("/status", get(refresh_status))
}

/// Start a refresh
///
/// # Response
///
/// - `202 Accepted` - run registered, loading continues in the background
/// - `409 Conflict` - a run is already in progress
#[tracing::instrument(skip(state))]
async fn start_refresh(State(state): State<RefreshState>) -> AppResult<Response> {
    let command = StartRefreshCommand {
        source: state.csv_path.clone(),
    };
    let response = super::commands::start::handle(&state.coordinator, command)?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(state))]
async fn refresh_status(State(state): State<RefreshState>) -> Response {
    let status = super::queries::status::handle(&state.coordinator, GetRefreshStatusQuery);
    ApiResponse::success(status).into_response()
}

impl From<StartRefreshError> for AppError {
    fn from(err: StartRefreshError) -> Self {
        match err {
            StartRefreshError::AlreadyRunning(e) => AppError::Conflict(e.to_string()),
        }
    }
}
