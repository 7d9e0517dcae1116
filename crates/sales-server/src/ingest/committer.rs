//! Batch committer
//!
//! Writes one accumulation window inside a single gateway transaction:
//!
//! 1. customers, upserted (last write wins)
//! 2. products, upserted (last write wins)
//! 3. orders, inserted with existing keys skipped (first write wins)
//!
//! A failure at any step drops the transaction, rolling the whole batch back.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::gateway::{EntityRows, GatewayError, PersistenceGateway};
use super::reducer::Batch;

/// The failed step, carrying the gateway error
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("error starting transaction: {0}")]
    Begin(#[source] GatewayError),

    #[error("error upserting customers: {0}")]
    Customers(#[source] GatewayError),

    #[error("error upserting products: {0}")]
    Products(#[source] GatewayError),

    #[error("error creating orders: {0}")]
    Orders(#[source] GatewayError),

    #[error("error committing transaction: {0}")]
    Commit(#[source] GatewayError),
}

/// Row counts reported by the gateway for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub customers_written: u64,
    pub products_written: u64,
    pub orders_inserted: u64,
    /// Orders whose key already existed
    pub orders_skipped: u64,
}

#[derive(Clone)]
pub struct BatchCommitter {
    gateway: Arc<dyn PersistenceGateway>,
}

impl BatchCommitter {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    pub async fn commit(&self, batch: &Batch) -> Result<CommitStats, CommitError> {
        let mut tx = self.gateway.begin().await.map_err(CommitError::Begin)?;

        let customers_written = tx
            .upsert(EntityRows::Customers(&batch.customers))
            .await
            .map_err(CommitError::Customers)?;

        let products_written = tx
            .upsert(EntityRows::Products(&batch.products))
            .await
            .map_err(CommitError::Products)?;

        let orders_inserted = tx
            .insert_ignoring_conflicts(EntityRows::Orders(&batch.orders))
            .await
            .map_err(CommitError::Orders)?;

        tx.commit().await.map_err(CommitError::Commit)?;

        let stats = CommitStats {
            customers_written,
            products_written,
            orders_inserted,
            orders_skipped: (batch.orders.len() as u64).saturating_sub(orders_inserted),
        };
        debug!(?stats, "Batch transaction committed");

        Ok(stats)
    }
}
