//! Error types for roster-core

use std::path::PathBuf;

use roster_model::ValidationFailure;

/// Result type for roster-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in roster-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The draft cannot be submitted
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration at {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("Failed to parse configuration at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// The background write task did not run to completion
    #[error("Submit task failed: {message}")]
    TaskFailed { message: String },

    // Transparent wrappers for underlying crate errors
    /// Record model error from roster-model
    #[error(transparent)]
    Model(#[from] roster_model::Error),

    /// Sync client error from roster-sync
    #[error(transparent)]
    Sync(#[from] roster_sync::Error),

    /// Store error from roster-sync
    #[error(transparent)]
    Store(#[from] roster_sync::StoreError),
}

impl Error {
    /// Whether a cascading field referenced a location absent from the hierarchy
    pub fn is_invalid_lookup(&self) -> bool {
        matches!(self, Error::Model(roster_model::Error::InvalidLookup(_)))
    }

    /// Message for the blocking notification shown to the user
    ///
    /// Validation failures use their dedicated wording; remote failures are
    /// reported generically.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(failure) => failure.user_message().to_string(),
            Error::Sync(roster_sync::Error::NotFound { .. }) => {
                "This student no longer exists.".to_string()
            }
            Error::Sync(_) | Error::TaskFailed { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
