//! Error types for the Scout services
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Service Error Enum ==
/// Unified error type for the cache, error log and HTTP layer.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Key or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalidation pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A single value is larger than the whole cache budget
    #[error("Value of {size} bytes exceeds cache budget of {budget} bytes")]
    ValueTooLarge { size: usize, budget: usize },
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidRequest(_) | ServiceError::InvalidPattern(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::ValueTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the Scout services.
pub type Result<T> = std::result::Result<T, ServiceError>;
