//! Response envelope for write operations
//!
//! Write endpoints answer with a uniform `{ status, message }` body; the
//! message is the outcome's literal rendering ("OK", not-found, no-changes).
//! Read endpoints return their payload directly.

use axum::http::StatusCode;
use serde::Serialize;

use core_kernel::WriteOutcome;

/// Uniform body for create/update/delete responses
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    /// Whether the operation ran without a fault (a no-op update still
    /// counts as success)
    pub status: bool,
    pub message: String,
    /// Generated id, present on create responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl OperationResponse {
    /// Response for a successful create, carrying the generated id
    pub fn created(id: impl Into<i32>) -> Self {
        Self {
            status: true,
            message: "OK".to_string(),
            id: Some(id.into()),
        }
    }

    /// Maps a write outcome to its HTTP status and body
    pub fn from_outcome(outcome: WriteOutcome) -> (StatusCode, Self) {
        let status_code = if outcome.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };
        let body = Self {
            status: !outcome.is_not_found(),
            message: outcome.to_string(),
            id: None,
        };
        (status_code, body)
    }
}
