//! Sales data ingestion
//!
//! Loads the sales CSV into Postgres in bounded batches while exposing live
//! progress. Data flows leaf-first through:
//!
//! - **source**: reads the CSV on a blocking thread, header discarded
//! - **parser**: one raw line into customer, product and order values
//! - **reducer**: deduplicates customers/products, appends orders
//! - **committer**: one batch per gateway transaction
//! - **coordinator**: single-flight runs and the shared status snapshot
//!
//! Supporting modules:
//!
//! - **gateway**: persistence traits with Postgres and in-memory backends
//! - **config**: `CSV_FILE_PATH`, `BATCH_SIZE`, `REFRESH_CRON`
//! - **scheduler**: cron-driven refreshes
//!
//! # Public API
//!
//! The HTTP surface lives in `features::refresh`:
//! - `POST /api/v1/refresh` - start a run
//! - `GET /api/v1/refresh/status` - current status snapshot

pub mod committer;
pub mod config;
pub mod coordinator;
pub mod gateway;
pub mod models;
pub mod parser;
pub mod reducer;
pub mod scheduler;
pub mod source;

pub use committer::{BatchCommitter, CommitError, CommitStats};
pub use config::IngestConfig;
pub use coordinator::{IngestError, IngestionCoordinator, IngestionStatus, RunTicket, StartError};
pub use gateway::{MemoryGateway, PersistenceGateway, PgGateway};
pub use models::{Customer, EntityKind, Order, Product};
pub use scheduler::RefreshScheduler;
pub use source::SourceLocator;
