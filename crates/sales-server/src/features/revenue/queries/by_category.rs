use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{RevenueError, ORDER_REVENUE_SQL};
use crate::features::shared::DateRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueByCategoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

impl Request<Result<Vec<CategoryRevenue>, RevenueError>> for RevenueByCategoryQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: RevenueByCategoryQuery,
) -> Result<Vec<CategoryRevenue>, RevenueError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

    let sql = format!(
        r#"
        SELECT products.category,
               COALESCE(SUM({ORDER_REVENUE_SQL}), 0)::float8 AS revenue
        FROM products
        LEFT JOIN orders
            ON products.product_id = orders.product_id
           AND orders.date_of_sale BETWEEN $1 AND $2
        GROUP BY products.category
        ORDER BY revenue DESC, products.category
        "#
    );

    let rows = sqlx::query_as::<_, CategoryRevenue>(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&pool)
        .await?;

    Ok(rows)
}
