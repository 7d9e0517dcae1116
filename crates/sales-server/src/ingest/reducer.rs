//! Entity reducer
//!
//! Folds parsed lines into one accumulation window: customers and products
//! deduplicated by natural key (last occurrence wins), orders appended in
//! input order with no deduplication.

use std::collections::BTreeMap;

use super::models::{Customer, Order, Product};
use super::parser::ParsedLine;

/// In-memory state between two commits
#[derive(Debug, Default)]
pub struct Accumulator {
    customers: BTreeMap<String, Customer>,
    products: BTreeMap<String, Product>,
    orders: Vec<Order>,
}

/// A drained accumulation window, ready to commit
///
/// Reference entities are sorted by natural key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty() && self.products.is_empty() && self.orders.is_empty()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, line: ParsedLine) {
        let ParsedLine {
            customer,
            product,
            order,
            ..
        } = line;

        self.customers.insert(customer.customer_id.clone(), customer);
        self.products.insert(product.product_id.clone(), product);
        self.orders.push(order);
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.customers.is_empty() && self.products.is_empty()
    }

    /// Drain the window, leaving the accumulator empty
    pub fn take_batch(&mut self) -> Batch {
        Batch {
            customers: std::mem::take(&mut self.customers).into_values().collect(),
            products: std::mem::take(&mut self.products).into_values().collect(),
            orders: std::mem::take(&mut self.orders),
        }
    }
}
