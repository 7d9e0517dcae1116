use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{RevenueError, ORDER_REVENUE_SQL};
use crate::features::shared::DateRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueByProductQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ProductRevenue {
    pub product_id: String,
    pub product_name: String,
    pub revenue: f64,
}

impl Request<Result<Vec<ProductRevenue>, RevenueError>> for RevenueByProductQuery {}

/// Revenue per product, highest first
///
/// Products without orders in the range are listed with zero revenue.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: RevenueByProductQuery,
) -> Result<Vec<ProductRevenue>, RevenueError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

    let sql = format!(
        r#"
        SELECT products.product_id,
               products.name AS product_name,
               COALESCE(SUM({ORDER_REVENUE_SQL}), 0)::float8 AS revenue
        FROM products
        LEFT JOIN orders
            ON products.product_id = orders.product_id
           AND orders.date_of_sale BETWEEN $1 AND $2
        GROUP BY products.product_id, products.name
        ORDER BY revenue DESC, products.product_id
        "#
    );

    let rows = sqlx::query_as::<_, ProductRevenue>(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&pool)
        .await?;

    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::features::revenue::queries::fixtures::seed_sales;

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_revenue_by_product(pool: PgPool) -> sqlx::Result<()> {
        seed_sales(&pool).await?;

        let query = RevenueByProductQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-02-29".to_string()),
        };
        let rows = handle(pool, query).await.unwrap();

        let ids: Vec<_> = rows.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, ["P2", "P1", "P3"]);
        assert_eq!(rows[0].product_name, "Gadget");
        assert!((rows[0].revenue - 145.0).abs() < 1e-9);
        assert!((rows[1].revenue - 29.0).abs() < 1e-9);
        assert_eq!(rows[2].revenue, 0.0);
        Ok(())
    }
}
