//! Feature modules implementing the sales API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes. Commands and queries are plain request types marked with the
//! `mediator` crate's `Request` trait and handled by a free `handle` function.
//!
//! # Features
//!
//! - **refresh**: start a CSV ingestion run and poll its status
//! - **revenue**: revenue totals and breakdowns over a date range

pub mod refresh;
pub mod revenue;
pub mod shared;

use axum::Router;
use std::path::PathBuf;

use crate::ingest::IngestionCoordinator;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for report queries
    pub db: sqlx::PgPool,
    /// Single-flight ingestion driver
    pub coordinator: IngestionCoordinator,
    /// CSV file loaded by `POST /refresh`
    pub csv_path: PathBuf,
}

/// Creates the API router with all feature routes mounted
///
/// - `/refresh` - data refresh control
/// - `/revenue` - revenue reports
pub fn router(state: FeatureState) -> Router<()> {
    let refresh_state = refresh::RefreshState {
        coordinator: state.coordinator,
        csv_path: state.csv_path,
    };

    Router::new()
        .nest("/refresh", refresh::refresh_routes().with_state(refresh_state))
        .nest("/revenue", revenue::revenue_routes().with_state(state.db))
}
