use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{RevenueError, ORDER_REVENUE_SQL};
use crate::features::shared::DateRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalRevenueQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalRevenue {
    pub total_revenue: f64,
}

impl Request<Result<TotalRevenue, RevenueError>> for TotalRevenueQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: TotalRevenueQuery) -> Result<TotalRevenue, RevenueError> {
    let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

    let sql = format!(
        r#"
        SELECT COALESCE(SUM({ORDER_REVENUE_SQL}), 0)::float8
        FROM orders
        JOIN products ON products.product_id = orders.product_id
        WHERE orders.date_of_sale BETWEEN $1 AND $2
        "#
    );

    let total_revenue: f64 = sqlx::query_scalar(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&pool)
        .await?;

    Ok(TotalRevenue { total_revenue })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::features::revenue::queries::fixtures::seed_sales;
    use crate::features::shared::DateRangeError;

    fn query(start: &str, end: &str) -> TotalRevenueQuery {
        TotalRevenueQuery {
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    #[tokio::test]
    async fn test_validation_runs_before_database() {
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let err = handle(pool, TotalRevenueQuery::default()).await.unwrap_err();
        assert!(matches!(err, RevenueError::Validation(DateRangeError::Missing)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_total_revenue(pool: PgPool) -> sqlx::Result<()> {
        seed_sales(&pool).await?;

        let revenue = handle(pool.clone(), query("2024-01-01", "2024-02-29")).await.unwrap();
        assert!((revenue.total_revenue - 174.0).abs() < 1e-9);

        // Both ends of the range are inclusive.
        let revenue = handle(pool.clone(), query("2024-01-10", "2024-01-10")).await.unwrap();
        assert!((revenue.total_revenue - 29.0).abs() < 1e-9);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_total_revenue_empty_range_is_zero(pool: PgPool) -> sqlx::Result<()> {
        seed_sales(&pool).await?;

        let revenue = handle(pool, query("2023-01-01", "2023-12-31")).await.unwrap();
        assert_eq!(revenue.total_revenue, 0.0);
        Ok(())
    }
}
