//! Sales analytics server library
//!
//! Loads a sales CSV export (orders joined with customer and product
//! attributes) into Postgres and serves revenue reports over it.
//!
//! - **ingest**: single-flight, batched CSV ingestion with live status
//! - **features**: HTTP slices for data refresh and revenue reports
//! - **api**: router assembly, response envelopes, health check
//! - **config**: environment-based server configuration
//! - **middleware**: CORS and request tracing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sales_server::ingest::{IngestionCoordinator, MemoryGateway};
//!
//! # async fn run() {
//! let coordinator = IngestionCoordinator::new(Arc::new(MemoryGateway::new()), 1000);
//! coordinator.start("data/sales.csv").ok();
//! println!("{:?}", coordinator.status());
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

pub use error::{AppError, AppResult};
