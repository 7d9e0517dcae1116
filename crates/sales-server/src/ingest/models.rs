//! Entity types produced by the ingestion pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Customer reference entity, keyed by `customer_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub region: String,
}

/// Product reference entity, keyed by `product_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit_price: f64,
}

/// Order transaction record, keyed by `order_id`
///
/// Customer and product keys are not checked against the reference sets
/// when the line is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub product_id: String,
    pub date_of_sale: NaiveDate,
    pub quantity: i32,
    pub discount: f64,
    pub shipping_cost: f64,
    pub payment_method: String,
}

/// The entity classes the persistence gateway knows how to store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Product,
    Order,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Product => "product",
            EntityKind::Order => "order",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Product => "products",
            EntityKind::Order => "orders",
        }
    }

    /// Natural key column
    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer_id",
            EntityKind::Product => "product_id",
            EntityKind::Order => "order_id",
        }
    }

    /// Insert columns in bind order, key first
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Customer => &["customer_id", "name", "email", "address", "region"],
            EntityKind::Product => &["product_id", "name", "category", "unit_price"],
            EntityKind::Order => &[
                "order_id",
                "customer_id",
                "product_id",
                "date_of_sale",
                "quantity",
                "discount",
                "shipping_cost",
                "payment_method",
            ],
        }
    }

    /// Columns overwritten when an upsert hits an existing key
    pub fn update_columns(&self) -> &'static [&'static str] {
        &self.columns()[1..]
    }

    /// Rows per INSERT that keep the statement under Postgres' 65535 bind limit
    pub fn rows_per_statement(&self) -> usize {
        const MAX_BIND_PARAMS: usize = 65_535;
        MAX_BIND_PARAMS / self.columns().len()
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
