//! Structured error types for the semantic index REST API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use semindex_sparql::SparqlError;

/// Structured API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Application-level error that converts into an HTTP response.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_ARGUMENT".into(),
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".into(),
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = axum::Json(ApiError {
            code: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

/// Upstream query failures map to proper gateway statuses instead of being
/// smuggled inside a 200 response body.
impl From<SparqlError> for AppError {
    fn from(err: SparqlError) -> Self {
        let (status, code) = match &err {
            SparqlError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            SparqlError::EndpointUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
            }
            SparqlError::MalformedQuery(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_QUERY_REJECTED"),
            SparqlError::InvalidResponse(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_BAD_RESPONSE"),
        };
        Self {
            status,
            code: code.into(),
            message: err.to_string(),
        }
    }
}
