//! Postgres persistence gateway
//!
//! Rows are written with multi-row `INSERT ... VALUES` statements built by
//! [`QueryBuilder`]. Large slices are split so that no statement exceeds the
//! bind-parameter limit (see [`EntityKind::rows_per_statement`]).
//!
//! `upsert` must not receive two rows with the same key in one call; Postgres
//! refuses to update the same row twice within a statement. The reducer
//! guarantees this for customers and products.

use async_trait::async_trait;
use sqlx::{query_builder::Separated, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use super::{EntityRows, GatewayError, GatewayTransaction, PersistenceGateway};
use crate::ingest::models::{Customer, EntityKind, Order, Product};

/// Gateway over a Postgres connection pool
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn begin(&self) -> Result<Box<dyn GatewayTransaction>, GatewayError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgGatewayTransaction { tx }))
    }
}

struct PgGatewayTransaction {
    tx: Transaction<'static, Postgres>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnConflict {
    Update,
    Ignore,
}

impl PgGatewayTransaction {
    async fn write(
        &mut self,
        rows: EntityRows<'_>,
        on_conflict: OnConflict,
    ) -> Result<u64, GatewayError> {
        let kind = rows.kind();
        match rows {
            EntityRows::Customers(rows) => self.write_chunks(kind, rows, on_conflict).await,
            EntityRows::Products(rows) => self.write_chunks(kind, rows, on_conflict).await,
            EntityRows::Orders(rows) => self.write_chunks(kind, rows, on_conflict).await,
        }
    }

    async fn write_chunks<T: BindRow>(
        &mut self,
        kind: EntityKind,
        rows: &[T],
        on_conflict: OnConflict,
    ) -> Result<u64, GatewayError> {
        let mut affected = 0;

        for chunk in rows.chunks(kind.rows_per_statement()) {
            let mut query_builder = build_insert(kind, chunk, on_conflict);
            let result = query_builder.build().execute(&mut *self.tx).await?;
            affected += result.rows_affected();

            debug!(
                table = kind.table(),
                rows = chunk.len(),
                affected = result.rows_affected(),
                "Wrote chunk"
            );
        }

        Ok(affected)
    }
}

#[async_trait]
impl GatewayTransaction for PgGatewayTransaction {
    async fn upsert(&mut self, rows: EntityRows<'_>) -> Result<u64, GatewayError> {
        self.write(rows, OnConflict::Update).await
    }

    async fn insert_ignoring_conflicts(
        &mut self,
        rows: EntityRows<'_>,
    ) -> Result<u64, GatewayError> {
        self.write(rows, OnConflict::Ignore).await
    }

    async fn commit(self: Box<Self>) -> Result<(), GatewayError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Binds one row's values in [`EntityKind::columns`] order
trait BindRow: Sync {
    fn bind_row<'args>(&'args self, row: &mut Separated<'_, 'args, Postgres, &'static str>);
}

impl BindRow for Customer {
    fn bind_row<'args>(&'args self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(&self.customer_id)
            .push_bind(&self.name)
            .push_bind(&self.email)
            .push_bind(&self.address)
            .push_bind(&self.region);
    }
}

impl BindRow for Product {
    fn bind_row<'args>(&'args self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(&self.product_id)
            .push_bind(&self.name)
            .push_bind(&self.category)
            .push_bind(self.unit_price);
    }
}

impl BindRow for Order {
    fn bind_row<'args>(&'args self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(&self.order_id)
            .push_bind(&self.customer_id)
            .push_bind(&self.product_id)
            .push_bind(self.date_of_sale)
            .push_bind(self.quantity)
            .push_bind(self.discount)
            .push_bind(self.shipping_cost)
            .push_bind(&self.payment_method);
    }
}

fn build_insert<'args, T: BindRow>(
    kind: EntityKind,
    rows: &'args [T],
    on_conflict: OnConflict,
) -> QueryBuilder<'args, Postgres> {
    let mut query_builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        kind.table(),
        kind.columns().join(", ")
    ));

    query_builder.push_values(rows, |mut b, row| row.bind_row(&mut b));

    match on_conflict {
        OnConflict::Update => {
            let assignments = kind
                .update_columns()
                .iter()
                .map(|column| format!("{column} = EXCLUDED.{column}"))
                .collect::<Vec<_>>()
                .join(", ");
            query_builder.push(format!(
                " ON CONFLICT ({}) DO UPDATE SET {}, updated_at = NOW()",
                kind.key_column(),
                assignments
            ));
        },
        OnConflict::Ignore => {
            query_builder.push(format!(" ON CONFLICT ({}) DO NOTHING", kind.key_column()));
        },
    }

    query_builder
}
