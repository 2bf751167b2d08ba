//! Error type shared by the boundary operations of the crate.
//!
//! The numeric core (distance, statistics, the three detectors) is total and
//! never fails. Errors only arise where data or configuration enter the crate.

use thiserror::Error;

/// Errors returned by validation, smoothing contracts and I/O.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// Input pings or flag sequences that violate the core's contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A threshold that failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A `gpstime` value that could not be parsed.
    #[cfg(feature = "io")]
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[cfg(feature = "io")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "io")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CleanerError>;
