use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{RevenueError, ORDER_REVENUE_SQL};
use crate::features::shared::DateRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueByRegionQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

impl Request<Result<Vec<RegionRevenue>, RevenueError>> for RevenueByRegionQuery {}

/// Revenue per customer region, highest first
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: RevenueByRegionQuery,
) -> Result<Vec<RegionRevenue>, RevenueError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

    let sql = format!(
        r#"
        SELECT customers.region,
               COALESCE(SUM({ORDER_REVENUE_SQL}), 0)::float8 AS revenue
        FROM customers
        LEFT JOIN orders
            ON customers.customer_id = orders.customer_id
           AND orders.date_of_sale BETWEEN $1 AND $2
        LEFT JOIN products ON products.product_id = orders.product_id
        GROUP BY customers.region
        ORDER BY revenue DESC, customers.region
        "#
    );

    let rows = sqlx::query_as::<_, RegionRevenue>(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&pool)
        .await?;

    Ok(rows)
}
