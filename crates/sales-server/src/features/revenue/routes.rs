//! Revenue API routes
//!
//! - `GET /api/v1/revenue` - total revenue
//! - `GET /api/v1/revenue/product` - revenue per product
//! - `GET /api/v1/revenue/category` - revenue per product category
//! - `GET /api/v1/revenue/region` - revenue per customer region
//!
//! Every route requires `start_date` and `end_date` (`YYYY-MM-DD`, inclusive).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::queries::{
    RevenueByCategoryQuery, RevenueByProductQuery, RevenueByRegionQuery, RevenueError,
    TotalRevenueQuery,
};
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};

pub fn revenue_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(total_revenue))
        .route("/product", get(revenue_by_product))
        .route("/category", get(revenue_by_category))
        .route("/region", get(revenue_by_region))
}

#[tracing::instrument(skip(pool))]
async fn total_revenue(
    State(pool): State<PgPool>,
    Query(query): Query<TotalRevenueQuery>,
) -> AppResult<Response> {
    let response = super::queries::total::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn revenue_by_product(
    State(pool): State<PgPool>,
    Query(query): Query<RevenueByProductQuery>,
) -> AppResult<Response> {
    let rows = super::queries::by_product::handle(pool, query).await?;
    Ok(list_response(rows))
}

#[tracing::instrument(skip(pool))]
async fn revenue_by_category(
    State(pool): State<PgPool>,
    Query(query): Query<RevenueByCategoryQuery>,
) -> AppResult<Response> {
    let rows = super::queries::by_category::handle(pool, query).await?;
    Ok(list_response(rows))
}

#[tracing::instrument(skip(pool))]
async fn revenue_by_region(
    State(pool): State<PgPool>,
    Query(query): Query<RevenueByRegionQuery>,
) -> AppResult<Response> {
    let rows = super::queries::by_region::handle(pool, query).await?;
    Ok(list_response(rows))
}

fn list_response<T: serde::Serialize>(rows: Vec<T>) -> Response {
    tracing::debug!(count = rows.len(), "Revenue breakdown computed");
    let meta = json!({ "count": rows.len() });
    (StatusCode::OK, Json(ApiResponse::success_with_meta(rows, meta))).into_response()
}

impl From<RevenueError> for AppError {
    fn from(err: RevenueError) -> Self {
        match err {
            RevenueError::Validation(e) => AppError::Validation(e.to_string()),
            RevenueError::Database(e) => AppError::Database(e),
        }
    }
}
