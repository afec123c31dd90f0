//! Error types for the orbit cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Orbit Error Enum ==
/// Unified error type for propagation, caching and the HTTP adapter.
///
/// Every variant is scoped to the single request (or speculative computation)
/// that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// Orbital elements or rotation parameters failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown object identifier
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Propagation produced no samples for the requested window
    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for OrbitError {
    fn into_response(self) -> Response {
        let status = match &self {
            OrbitError::Validation(_) => StatusCode::BAD_REQUEST,
            OrbitError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OrbitError::NotFound(_) => StatusCode::NOT_FOUND,
            OrbitError::ComputationFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OrbitError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the orbit cache.
pub type Result<T> = std::result::Result<T, OrbitError>;
