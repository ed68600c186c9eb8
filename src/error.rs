//! Error types for the cache
//!
//! Every backend, local or remote, reports failures through the same
//! taxonomy so callers can tell "not present" apart from "unreachable".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backends::BackendKind;

// == Cache Error Enum ==
/// Unified error type for every cache backend and the facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent or expired at read time
    #[error("Cache miss: {0}")]
    CacheMiss(String),

    /// Explicit delete of an absent key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Mirror-mode read exhausted every backend
    #[error("Key not found in any cache: {0}")]
    NotFoundAnywhere(String),

    /// A remote backend could not be reached or failed at protocol level
    #[error("Backend {backend} unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    /// Malformed configuration detected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed caller input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Builds a `BackendUnavailable` from anything printable.
    pub fn unavailable(backend: BackendKind, reason: impl ToString) -> Self {
        CacheError::BackendUnavailable {
            backend,
            reason: reason.to_string(),
        }
    }

    /// True for the "the key is simply not there" family of errors.
    pub fn is_not_present(&self) -> bool {
        matches!(
            self,
            CacheError::CacheMiss(_) | CacheError::KeyNotFound(_) | CacheError::NotFoundAnywhere(_)
        )
    }

    /// True when infrastructure, not data, caused the failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::BackendUnavailable { .. })
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::CacheMiss(_)
            | CacheError::KeyNotFound(_)
            | CacheError::NotFoundAnywhere(_) => StatusCode::NOT_FOUND,
            CacheError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
