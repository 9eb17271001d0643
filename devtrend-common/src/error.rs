//! Common error types for DevTrend

use thiserror::Error;

/// Common result type for DevTrend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the aggregation pipeline and the query service
#[derive(Error, Debug)]
pub enum Error {
    /// Dimension key is not one of the registered dimensions
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Underlying store missing, unreachable, or rejecting a statement
    #[error("Storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Valid query that matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
