//! API error taxonomy.
//!
//! Only gate and validation failures surface as transport errors. Failures
//! of the two external collaborators are business outcomes embedded in a 200
//! payload (`inference.error`, absent narrative): the standalone enrichment
//! endpoint is the one exception, since it has nothing else to return.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nereus_core::{MissingFields, TokenError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client data failed shape/required-field checks.
    #[error("{0}")]
    InvalidInput(String),
    /// Missing, malformed, or expired token.
    #[error("{0}")]
    Unauthorized(String),
    /// Duplicate registration.
    #[error("{0}")]
    Conflict(String),
    /// Narrative service not configured; only the standalone endpoint
    /// reports this.
    #[error("{0}")]
    NotConfigured(String),
    /// Narrative service errored; only the standalone endpoint reports this.
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref msg) = self {
            tracing::error!("internal fault: {msg}");
        }
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<MissingFields> for ApiError {
    fn from(err: MissingFields) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}
