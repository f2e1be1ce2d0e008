// --- File: crates/bookwell_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Bookwell errors.
///
/// This enum provides the error taxonomy shared across all crates. Each crate
/// can extend this by implementing From<SpecificError> for BookwellError.
#[derive(Error, Debug)]
pub enum BookwellError {
    /// Malformed input: bad time format, start >= end, override missing times.
    /// Rejected before touching storage.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No matching practitioner, appointment or settings row.
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// The requested slot is no longer available at commit time.
    /// The caller should re-fetch availability.
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Missing or invalid credentials on a gated endpoint.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// An external calendar fetch failed; sync for that provider is skipped
    /// and the stale cache retained.
    #[error("Upstream sync error: {provider} - {message}")]
    UpstreamSyncError { provider: String, message: String },

    /// A notification send failed. Recorded per item, never fatal to a batch.
    #[error("Dispatch error: {0}")]
    DispatchError(String),

    /// Error occurred during a database operation.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error that doesn't fit into any other category.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookwellError {
    fn status_code(&self) -> u16 {
        match self {
            BookwellError::ValidationError(_) => 400,
            BookwellError::NotFoundError(_) => 404,
            BookwellError::ConflictError(_) => 409,
            BookwellError::AuthError(_) => 401,
            BookwellError::UpstreamSyncError { .. } => 502,
            BookwellError::DispatchError(_) => 502,
            BookwellError::DatabaseError(_) => 500,
            BookwellError::ConfigError(_) => 500,
            BookwellError::InternalError(_) => 500,
        }
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> BookwellError {
    BookwellError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BookwellError {
    BookwellError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BookwellError {
    BookwellError::ConflictError(message.to_string())
}

pub fn upstream_sync_error<T: fmt::Display>(provider: &str, message: T) -> BookwellError {
    BookwellError::UpstreamSyncError {
        provider: provider.to_string(),
        message: message.to_string(),
    }
}

pub fn dispatch_error<T: fmt::Display>(message: T) -> BookwellError {
    BookwellError::DispatchError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> BookwellError {
    BookwellError::InternalError(message.to_string())
}

impl From<serde_json::Error> for BookwellError {
    fn from(err: serde_json::Error) -> Self {
        BookwellError::ValidationError(err.to_string())
    }
}
