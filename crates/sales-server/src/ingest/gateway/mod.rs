//! Persistence gateway
//!
//! The ingestion pipeline writes through these traits and never touches SQL
//! directly. A gateway hands out transactions; every write made through one
//! transaction becomes visible atomically on [`GatewayTransaction::commit`].
//! Dropping a transaction without committing discards its writes.
//!
//! Two implementations exist:
//! - [`PgGateway`]: Postgres via sqlx, multi-row `INSERT ... ON CONFLICT`
//! - [`MemoryGateway`]: in-process maps, used by tests

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Customer, EntityKind, Order, Product};

pub mod memory;
pub mod postgres;

pub use memory::{CommitRecord, MemoryGateway};
pub use postgres::PgGateway;

/// Rows of a single entity class
#[derive(Debug, Clone, Copy)]
pub enum EntityRows<'a> {
    Customers(&'a [Customer]),
    Products(&'a [Product]),
    Orders(&'a [Order]),
}

impl EntityRows<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRows::Customers(_) => EntityKind::Customer,
            EntityRows::Products(_) => EntityKind::Product,
            EntityRows::Orders(_) => EntityKind::Order,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntityRows::Customers(rows) => rows.len(),
            EntityRows::Products(rows) => rows.len(),
            EntityRows::Orders(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Source of transactions against the store
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn GatewayTransaction>, GatewayError>;
}

/// One atomic unit of writes
#[async_trait]
pub trait GatewayTransaction: Send {
    /// Insert rows, overwriting the kind's update columns on key conflict
    ///
    /// Returns the number of rows inserted or updated.
    async fn upsert(&mut self, rows: EntityRows<'_>) -> Result<u64, GatewayError>;

    /// Insert rows, skipping any whose key already exists
    ///
    /// Returns the number of rows actually inserted.
    async fn insert_ignoring_conflicts(&mut self, rows: EntityRows<'_>)
        -> Result<u64, GatewayError>;

    async fn commit(self: Box<Self>) -> Result<(), GatewayError>;
}
