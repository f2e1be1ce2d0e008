//! Error types for the database layer

use bookwell_common::BookwellError;
use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A row could not be decoded into its domain model
    #[error("Row mapping error: {0}")]
    MappingError(String),

    /// A guarded insert or update found an overlapping blocking row
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist (or is no longer in the expected state)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DbError> for BookwellError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(msg) => BookwellError::ConflictError(msg),
            DbError::NotFound(msg) => BookwellError::NotFoundError(msg),
            DbError::ConfigError(msg) => BookwellError::ConfigError(msg),
            other => BookwellError::DatabaseError(other.to_string()),
        }
    }
}
