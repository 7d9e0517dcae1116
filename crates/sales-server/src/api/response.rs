//! API response types
//!
//! Every endpoint answers with the same envelope: `success` plus either
//! `data` (and optional `meta`) or an `error` object.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Create a success response with metadata
    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let value = serde_json::to_value(ApiResponse::success(json!({"total_revenue": 12.5})))
            .unwrap();
        assert_eq!(value, json!({"success": true, "data": {"total_revenue": 12.5}}));
    }

    #[test]
    fn test_meta_is_serialized_when_present() {
        let value =
            serde_json::to_value(ApiResponse::success_with_meta(vec![1, 2], json!({"count": 2})))
                .unwrap();
        assert_eq!(value["meta"]["count"], 2);
    }

    #[test]
    fn test_error_envelope() {
        let value = serde_json::to_value(ErrorResponse::new("CONFLICT", "busy")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": {"code": "CONFLICT", "message": "busy"}})
        );
    }
}
