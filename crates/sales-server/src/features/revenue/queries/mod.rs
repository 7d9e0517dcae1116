//! Revenue report queries
//!
//! Revenue of an order is `unit_price * quantity - discount + shipping_cost`,
//! summed over orders whose `date_of_sale` lies in an inclusive date range.

pub mod by_category;
pub mod by_product;
pub mod by_region;
pub mod total;

pub use by_category::{CategoryRevenue, RevenueByCategoryQuery};
pub use by_product::{ProductRevenue, RevenueByProductQuery};
pub use by_region::{RegionRevenue, RevenueByRegionQuery};
pub use total::{TotalRevenue, TotalRevenueQuery};

use crate::features::shared::validation::DateRangeError;

/// Revenue of a single joined order row, as SQL
pub(crate) const ORDER_REVENUE_SQL: &str =
    "(products.unit_price * orders.quantity) - orders.discount + orders.shipping_cost";

#[derive(Debug, thiserror::Error)]
pub enum RevenueError {
    #[error("{0}")]
    Validation(#[from] DateRangeError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
