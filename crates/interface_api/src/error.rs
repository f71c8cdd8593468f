//! API error handling
//!
//! Infrastructure failures inside the domain layers surface here as a
//! generic 500: the cause is logged server-side and never leaked to the
//! caller. Not-found and no-changes conditions never reach this type; they
//! travel as `WriteOutcome` values and map to responses in the DTO layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_catalog::CatalogError;
use domain_providers::ProviderError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        tracing::error!(error = %err, "provider operation failed");
        ApiError::Internal("The operation could not be completed".to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        tracing::error!(error = %err, "catalog operation failed");
        ApiError::Internal("The operation could not be completed".to_string())
    }
}

impl From<core_kernel::PortError> for ApiError {
    fn from(err: core_kernel::PortError) -> Self {
        tracing::error!(error = %err, "store operation failed");
        ApiError::Internal("The operation could not be completed".to_string())
    }
}

/// Runs validator-derive checks on an incoming body, collapsing failures
/// into one message.
pub fn validated<T: validator::Validate>(value: T) -> Result<T, ApiError> {
    match value.validate() {
        Ok(()) => Ok(value),
        Err(errors) => Err(ApiError::Validation(errors.to_string())),
    }
}
