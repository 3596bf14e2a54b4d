//! Mapping of store errors to HTTP status codes.

use http::StatusCode;
use secretd_model::StoreError;

/// A store error resolved to the status and message sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Response status.
    pub status: StatusCode,
    /// Response body. Always the error's own message, never rewritten.
    pub message: String,
}

/// Classify a store error.
///
/// Rules, in order:
///
/// 1. a status explicitly attached by the store wins;
/// 2. the write-validation sentinels map to `400 Bad Request`;
/// 3. everything else is `500 Internal Server Error`.
#[must_use]
pub fn classify(err: &StoreError) -> ClassifiedError {
    let status = match err {
        StoreError::PublicStatus { status, .. } => *status,
        StoreError::CannotWriteToVersion
        | StoreError::EmptySecret
        | StoreError::SecretTooBig { .. } => StatusCode::BAD_REQUEST,
        StoreError::Opaque { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    ClassifiedError {
        status,
        message: err.to_string(),
    }
}
