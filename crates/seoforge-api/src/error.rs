//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same `{error, message, details?}` body
//! and maps storage and generation errors onto HTTP status codes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use seoforge_core::error::SeoforgeError;
use seoforge_generate::GenerateError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "bad_gateway").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Upstream status/detail, when there is any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// 404 Not Found.
    #[error("{0}")]
    NotFound(String),
    /// 413 Payload Too Large - the body is over the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// 500 Internal Server Error. The text is logged, never returned.
    #[error("{0}")]
    Internal(String),
    /// 502 Bad Gateway - the AI endpoint failed or returned unusable data.
    #[error("{message}")]
    BadGateway {
        message: String,
        details: Option<serde_json::Value>,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg, None)
            }
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::BadGateway { message, details } => {
                (StatusCode::BAD_GATEWAY, "bad_gateway", message, details)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SeoforgeError> for ApiError {
    fn from(err: SeoforgeError) -> Self {
        match err {
            SeoforgeError::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::Validation(msg) => ApiError::BadRequest(msg),
            GenerateError::UpstreamUnavailable(detail) => ApiError::BadGateway {
                message: "Failed to connect to AI service".to_string(),
                details: Some(serde_json::json!({ "detail": detail })),
            },
            GenerateError::UpstreamError { status, detail } => ApiError::BadGateway {
                message: "AI generation failed".to_string(),
                details: Some(serde_json::json!({ "status": status, "detail": detail })),
            },
            GenerateError::UpstreamFormat { message, detail } => ApiError::BadGateway {
                message,
                details: Some(serde_json::json!({ "detail": detail })),
            },
            GenerateError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}
