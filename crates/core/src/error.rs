//! Error types
//!
//! Classification and search failures are recoverable by design: the router
//! falls back to the rule scorer and the aggregator proceeds with the
//! remaining sources. Only the dispatcher boundary converts errors into
//! user-facing text.

use thiserror::Error;

/// Errors from the external classifier.
///
/// Every variant is recovered locally by falling back to the deterministic
/// scorer; none of these ever reach the end user.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors from a single search source
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

/// Errors from the storage collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation failed: {0}")]
    Operation(String),
}

/// Errors from inside a dispatched handler.
///
/// Caught at the dispatcher boundary and converted into a generic
/// "temporarily unavailable" reply.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Handler failed: {0}")]
    Internal(String),
}
