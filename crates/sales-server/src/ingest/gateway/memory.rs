//! In-memory persistence gateway
//!
//! Each transaction works on a private copy of the store and swaps it in on
//! commit, so uncommitted writes are never observable. Every commit is logged
//! as a [`CommitRecord`].
//!
//! Two knobs make pipeline behaviour testable without a database:
//! - [`MemoryGateway::fail_on`] rejects writes of one entity class
//! - [`MemoryGateway::gated`] blocks `begin` until [`MemoryGateway::release`]
//!   hands out permits, which holds a run open for as long as a test needs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

use super::{EntityRows, GatewayError, GatewayTransaction, PersistenceGateway};
use crate::ingest::models::{Customer, EntityKind, Order, Product};

/// Row counts handed to one committed transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRecord {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<String, Customer>,
    products: BTreeMap<String, Product>,
    orders: BTreeMap<String, Order>,
}

#[derive(Default)]
struct Inner {
    tables: Mutex<Tables>,
    commits: Mutex<Vec<CommitRecord>>,
    fault: Mutex<Option<EntityKind>>,
    gate: Option<Semaphore>,
}

/// Gateway backed by in-process maps
#[derive(Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose `begin` waits for a permit from [`Self::release`]
    pub fn gated() -> Self {
        Self {
            inner: Arc::new(Inner {
                gate: Some(Semaphore::new(0)),
                ..Inner::default()
            }),
        }
    }

    /// Allow `n` more transactions to begin on a gated gateway
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.inner.gate {
            gate.add_permits(n);
        }
    }

    /// Reject every write of `kind` until [`Self::clear_fault`]
    pub fn fail_on(&self, kind: EntityKind) {
        *lock(&self.inner.fault) = Some(kind);
    }

    pub fn clear_fault(&self) {
        *lock(&self.inner.fault) = None;
    }

    pub fn customer(&self, customer_id: &str) -> Option<Customer> {
        lock(&self.inner.tables).customers.get(customer_id).cloned()
    }

    pub fn product(&self, product_id: &str) -> Option<Product> {
        lock(&self.inner.tables).products.get(product_id).cloned()
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        lock(&self.inner.tables).orders.get(order_id).cloned()
    }

    pub fn customer_count(&self) -> usize {
        lock(&self.inner.tables).customers.len()
    }

    pub fn product_count(&self) -> usize {
        lock(&self.inner.tables).products.len()
    }

    pub fn order_count(&self) -> usize {
        lock(&self.inner.tables).orders.len()
    }

    /// Committed transactions in commit order
    pub fn commits(&self) -> Vec<CommitRecord> {
        lock(&self.inner.commits).clone()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn begin(&self) -> Result<Box<dyn GatewayTransaction>, GatewayError> {
        if let Some(gate) = &self.inner.gate {
            gate.acquire()
                .await
                .map_err(|_| GatewayError::Rejected("gateway closed".to_string()))?
                .forget();
        }

        let staged = lock(&self.inner.tables).clone();
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            staged,
            record: CommitRecord::default(),
        }))
    }
}

struct MemoryTransaction {
    inner: Arc<Inner>,
    staged: Tables,
    record: CommitRecord,
}

impl MemoryTransaction {
    fn check_fault(&self, kind: EntityKind) -> Result<(), GatewayError> {
        match *lock(&self.inner.fault) {
            Some(fault) if fault == kind => Err(GatewayError::Rejected(format!(
                "{} writes are failing",
                kind.table()
            ))),
            _ => Ok(()),
        }
    }

    fn tally(&mut self, rows: &EntityRows<'_>) {
        match rows.kind() {
            EntityKind::Customer => self.record.customers += rows.len(),
            EntityKind::Product => self.record.products += rows.len(),
            EntityKind::Order => self.record.orders += rows.len(),
        }
    }
}

fn write_all<T: Clone>(
    table: &mut BTreeMap<String, T>,
    rows: &[T],
    key: fn(&T) -> &str,
    overwrite: bool,
) -> u64 {
    let mut affected = 0;
    for row in rows {
        let exists = table.contains_key(key(row));
        if overwrite || !exists {
            table.insert(key(row).to_string(), row.clone());
            affected += 1;
        }
    }
    affected
}

impl Tables {
    fn write(&mut self, rows: EntityRows<'_>, overwrite: bool) -> u64 {
        match rows {
            EntityRows::Customers(rows) => {
                write_all(&mut self.customers, rows, |c| c.customer_id.as_str(), overwrite)
            },
            EntityRows::Products(rows) => {
                write_all(&mut self.products, rows, |p| p.product_id.as_str(), overwrite)
            },
            EntityRows::Orders(rows) => {
                write_all(&mut self.orders, rows, |o| o.order_id.as_str(), overwrite)
            },
        }
    }
}

#[async_trait]
impl GatewayTransaction for MemoryTransaction {
    async fn upsert(&mut self, rows: EntityRows<'_>) -> Result<u64, GatewayError> {
        self.check_fault(rows.kind())?;
        self.tally(&rows);
        Ok(self.staged.write(rows, true))
    }

    async fn insert_ignoring_conflicts(
        &mut self,
        rows: EntityRows<'_>,
    ) -> Result<u64, GatewayError> {
        self.check_fault(rows.kind())?;
        self.tally(&rows);
        Ok(self.staged.write(rows, false))
    }

    async fn commit(self: Box<Self>) -> Result<(), GatewayError> {
        let MemoryTransaction {
            inner,
            staged,
            record,
        } = *self;

        *lock(&inner.tables) = staged;
        lock(&inner.commits).push(record);
        Ok(())
    }
}
