pub mod response;

use axum::{extract::State, routing::get, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::path::PathBuf;
use tower_http::compression::CompressionLayer;

use crate::config::CorsConfig;
use crate::error::{AppError, AppResult};
use crate::features;
use crate::ingest::IngestionCoordinator;
use crate::middleware;
use response::ApiResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub coordinator: IngestionCoordinator,
    pub csv_path: PathBuf,
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let feature_state = features::FeatureState {
        db: state.db.clone(),
        coordinator: state.coordinator.clone(),
        csv_path: state.csv_path.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api/v1", features::router(feature_state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Sales Analytics Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> AppResult<ApiResponse<Value>> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok(ApiResponse::success(json!({
            "status": "healthy",
            "database": "connected"
        }))),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(AppError::Unavailable("Database is unreachable".to_string()))
        },
    }
}
