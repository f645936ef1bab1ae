//! Error types for skiptable
//!
//! Provides a unified error type for all memtable operations.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for skiptable operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// The mutation cannot be encoded (oversized input, mis-sized buffer, ...)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A buffer handed to the decoder is not a well-formed internal entry
    #[error("Corrupted entry: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate entry for sequence {0}")]
    DuplicateEntry(u64),

    // -------------------------------------------------------------------------
    // Resource Errors
    // -------------------------------------------------------------------------
    #[error("Arena out of memory: requested {requested} bytes, capacity {capacity} bytes")]
    OutOfMemory { requested: usize, capacity: usize },

    #[error("Sequence space exhausted")]
    SequenceExhausted,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
