//! Error types for roster-sync

use std::fmt;
use std::path::PathBuf;

/// Result type for sync client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Write operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        })
    }
}

/// Errors surfaced by [`RemoteSyncClient`](crate::RemoteSyncClient)
///
/// Store failures during writes are collapsed into [`Error::WriteFailed`];
/// callers do not distinguish transient from permanent failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Update targeted a record that no longer exists
    #[error("Student record not found: {id}")]
    NotFound { id: String },

    /// Create, update or delete failed in the store
    #[error("Failed to {operation} student record: {message}")]
    WriteFailed { operation: WriteOp, message: String },

    /// The collection watch could not be established
    #[error("Subscription to {path} failed: {message}")]
    SubscriptionFailed { path: String, message: String },
}

impl Error {
    /// Collapse any failure during a write into [`Error::WriteFailed`]
    pub fn write_failed(operation: WriteOp, source: impl fmt::Display) -> Self {
        Self::WriteFailed {
            operation,
            message: source.to_string(),
        }
    }
}

/// Errors reported by a [`RemoteStore`](crate::RemoteStore)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// The caller may not access the path
    #[error("Permission denied at {path}")]
    PermissionDenied { path: String },

    /// The path is not a collection or document path
    #[error("Invalid store path: {path}")]
    InvalidPath { path: String },

    /// The document has the wrong shape for the path
    #[error("Invalid document at {path}: {message}")]
    InvalidDocument { path: String, message: String },

    /// No unique key could be generated
    #[error("Key generation failed: {message}")]
    KeyGeneration { message: String },

    /// The backing file could not be read or written
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be lock-protected
    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    /// The backing file holds malformed JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
