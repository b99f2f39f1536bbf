//! Error types for the Farmhouse sync engine.

use thiserror::Error;

/// Errors that can occur during a sync cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Remote server unreachable or credentials rejected. Aborts the cycle.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Bad engine configuration, or no usable calendar collection exists.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout or server-side failure. Retried once per item, then counted
    /// as a per-item failure.
    #[error("Transient remote error: {0}")]
    Transient(String),

    /// Wire text that does not parse as a scheduling object.
    #[error("Malformed object: {0}")]
    MalformedObject(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    /// Write to the local task store failed.
    #[error("Task store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
