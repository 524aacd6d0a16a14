use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the service layer.
///
/// Core operations return typed errors instead of silently no-opping;
/// callers decide how (or whether) to surface them to a user.
#[derive(Debug, Error, Serialize)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(
        #[from]
        #[serde(skip)]
        StoreError,
    ),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    /// Convenience constructor for missing-record errors keyed by id.
    pub fn not_found(kind: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{} {} not found", kind, id))
    }
}
