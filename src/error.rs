//! Error types for DiskDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DbError
pub type Result<T> = std::result::Result<T, DbError>;

/// Unified error type for DiskDB operations
#[derive(Debug, Error)]
pub enum DbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    /// Bytes at `offset` do not parse as a record
    #[error("Log corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    /// A record header or body runs past the end of the log
    #[error("Truncated record at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedRecord {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Key or value too long for the 32-bit length fields
    #[error("Record {field} of {len} bytes exceeds the maximum encodable length")]
    RecordTooLarge { field: &'static str, len: usize },

    /// A failed append left the log in a state it cannot append to
    #[error("Log poisoned: {0}")]
    LogPoisoned(String),

    /// Nothing left to read at the given offset
    #[error("End of log reached at offset {0}")]
    EndOfLog(u64),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// True for the end-of-data signal, which is not a failure during a scan
    pub fn is_end_of_log(&self) -> bool {
        matches!(self, DbError::EndOfLog(_))
    }

    /// True when the error describes a record cut short by end of file
    pub fn is_truncated(&self) -> bool {
        matches!(self, DbError::TruncatedRecord { .. })
    }
}
