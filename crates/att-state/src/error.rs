use std::path::PathBuf;

/// Errors from world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Keys must be non-empty strings.
    #[error("key must not be empty")]
    EmptyKey,

    /// The query string or selector cannot be evaluated.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A result iterator was used after it was closed.
    #[error("result iterator already closed")]
    IteratorClosed,

    /// A lock guarding ledger state was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The persisted ledger file cannot be decoded.
    #[error("corrupt ledger file {path}: {reason}")]
    CorruptLedger { path: PathBuf, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for world-state operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
