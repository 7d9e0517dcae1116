//! Ingestion coordinator
//!
//! Owns the only shared state of the pipeline: the [`IngestionStatus`]
//! snapshot behind a single mutex. Everything else a run touches (the CSV
//! source and the accumulation window) is private to the background task.
//!
//! ```text
//!            start() ok                stream exhausted, last batch committed
//!   Idle ─────────────────▶ Running ─────────────────────────────────────▶ Idle (last_completed_at)
//!     ▲                       │
//!     │  start() while        │ unreadable source, bad date, short line, commit failure
//!     │  running: rejected    ▼
//!     └──────────────────── Idle (last_error)
//! ```
//!
//! `records_processed` is bumped as each data line is read, before it is
//! parsed, so a fatal error on the fifth data line leaves it at 5. Batches
//! committed before a failure stay committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::committer::{BatchCommitter, CommitError};
use super::gateway::PersistenceGateway;
use super::parser::{parse_record, ParseError};
use super::reducer::Accumulator;
use super::source::{CsvSource, RecordSource, SourceError, SourceLocator};

/// Point-in-time view of the current or most recent run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionStatus {
    pub is_running: bool,
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub records_processed: u64,
    pub last_error: Option<String>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Handed back when a run is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTicket {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    #[error("data refresh is already in progress, please try again later")]
    AlreadyRunning,
}

/// Fatal run errors, recorded as `last_error`
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("error parsing record {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("batch {batch} failed: {source}")]
    Commit {
        batch: u64,
        #[source]
        source: CommitError,
    },
}

/// Totals for one successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub batches: u64,
    pub orders_inserted: u64,
    pub orders_skipped: u64,
    pub degraded_fields: u64,
}

/// Single-flight driver of parser, reducer and committer
#[derive(Clone)]
pub struct IngestionCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    status: Mutex<IngestionStatus>,
    committer: BatchCommitter,
    batch_size: usize,
}

impl IngestionCoordinator {
    /// `batch_size` is clamped to at least one order
    pub fn new(gateway: Arc<dyn PersistenceGateway>, batch_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                status: Mutex::new(IngestionStatus::default()),
                committer: BatchCommitter::new(gateway),
                batch_size: batch_size.max(1),
            }),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.inner.batch_size
    }

    /// Snapshot of the status; never waits on a running batch
    pub fn status(&self) -> IngestionStatus {
        self.inner.lock_status().clone()
    }

    /// Begin a run in the background
    ///
    /// Returns as soon as the run is registered. Its outcome is only visible
    /// through [`Self::status`]. Must be called within a Tokio runtime.
    pub fn start(&self, source: impl Into<SourceLocator>) -> Result<RunTicket, StartError> {
        let source = source.into();

        let ticket = {
            let mut status = self.inner.lock_status();
            if status.is_running {
                return Err(StartError::AlreadyRunning);
            }

            let ticket = RunTicket {
                run_id: Uuid::new_v4(),
                started_at: Utc::now(),
            };
            *status = IngestionStatus {
                is_running: true,
                run_id: Some(ticket.run_id),
                started_at: Some(ticket.started_at),
                ..IngestionStatus::default()
            };
            ticket
        };

        let span = info_span!("ingestion_run", run_id = %ticket.run_id);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run(source).instrument(span));

        Ok(ticket)
    }
}

impl Inner {
    fn lock_status(&self) -> MutexGuard<'_, IngestionStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, source: SourceLocator) {
        let mut guard = RunGuard {
            inner: Arc::clone(&self),
            finished: false,
        };

        info!(source = %source.describe(), batch_size = self.batch_size, "Ingestion run started");

        let outcome = self.ingest(source).await;

        let mut status = self.lock_status();
        status.is_running = false;
        match outcome {
            Ok(summary) => {
                status.last_error = None;
                status.last_completed_at = Some(Utc::now());
                info!(
                    records = summary.records,
                    batches = summary.batches,
                    orders_inserted = summary.orders_inserted,
                    orders_skipped = summary.orders_skipped,
                    degraded_fields = summary.degraded_fields,
                    "Ingestion run completed"
                );
            },
            Err(e) => {
                status.last_error = Some(e.to_string());
                error!(
                    error = %e,
                    records_processed = status.records_processed,
                    "Ingestion run failed"
                );
            },
        }
        guard.finished = true;
    }

    async fn ingest(&self, source: SourceLocator) -> Result<RunSummary, IngestError> {
        let mut source = CsvSource::open(source).await?;
        self.process(&mut source).await
    }

    async fn process(&self, source: &mut dyn RecordSource) -> Result<RunSummary, IngestError> {
        let mut accumulator = Accumulator::new();
        let mut summary = RunSummary::default();

        while let Some(record) = source.next_record().await? {
            summary.records += 1;
            let line = summary.records;
            self.lock_status().records_processed = line;

            let parsed =
                parse_record(&record).map_err(|source| IngestError::Parse { line, source })?;

            for field in &parsed.degraded {
                warn!(
                    line,
                    order_id = %parsed.order.order_id,
                    column = field.column,
                    raw = %field.raw,
                    "Unparseable numeric field, using 0"
                );
            }
            summary.degraded_fields += parsed.degraded.len() as u64;

            accumulator.apply(parsed);

            if accumulator.order_count() >= self.batch_size {
                self.flush(&mut accumulator, &mut summary).await?;
            }
        }

        if !accumulator.is_empty() {
            self.flush(&mut accumulator, &mut summary).await?;
        }

        Ok(summary)
    }

    async fn flush(
        &self,
        accumulator: &mut Accumulator,
        summary: &mut RunSummary,
    ) -> Result<(), IngestError> {
        let batch = accumulator.take_batch();
        summary.batches += 1;
        let number = summary.batches;

        let stats = self
            .committer
            .commit(&batch)
            .await
            .map_err(|source| IngestError::Commit {
                batch: number,
                source,
            })?;

        summary.orders_inserted += stats.orders_inserted;
        summary.orders_skipped += stats.orders_skipped;

        info!(
            batch = number,
            customers = batch.customers.len(),
            products = batch.products.len(),
            orders = batch.orders.len(),
            orders_skipped = stats.orders_skipped,
            "Batch committed"
        );

        Ok(())
    }
}

/// Clears `is_running` if the run task unwinds before recording an outcome
struct RunGuard {
    inner: Arc<Inner>,
    finished: bool,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            let mut status = self.inner.lock_status();
            status.is_running = false;
            status.last_error = Some("ingestion run aborted unexpectedly".to_string());
        }
    }
}
