//! Error types for cmdlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CmdLogError
pub type Result<T> = std::result::Result<T, CmdLogError>;

/// Unified error type for cmdlog operations
#[derive(Debug, Error)]
pub enum CmdLogError {
    // -------------------------------------------------------------------------
    // Invocation Errors
    // -------------------------------------------------------------------------
    #[error("Incorrect number of arguments for {operation}: expecting {expected}, got {got}")]
    Argument {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("Received unknown function {kind}: {function}")]
    UnknownFunction { kind: String, function: String },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to persist cursor under {key}: {source}")]
    Persistence {
        key: String,
        #[source]
        source: Box<CmdLogError>,
    },

    #[error("Log under {key} is full: cursor {cursor} cannot take {count} more entries")]
    CursorOverflow { key: String, cursor: u64, count: u64 },

    #[error("Store corruption detected: {0}")]
    StoreCorruption(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Envelope decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CmdLogError {
    /// Build a `KeyNotFound` from raw key bytes
    pub fn key_not_found(key: &[u8]) -> Self {
        CmdLogError::KeyNotFound(String::from_utf8_lossy(key).into_owned())
    }

    /// Whether this error means the key is simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmdLogError::KeyNotFound(_))
    }
}
