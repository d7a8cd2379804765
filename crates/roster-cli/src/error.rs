//! Error types for roster-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from roster-core
    #[error(transparent)]
    Core(#[from] roster_core::Error),

    /// Error from roster-model
    #[error(transparent)]
    Model(#[from] roster_model::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be set up
    #[error("Failed to initialise logging: {message}")]
    Logging { message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Text printed after `error:`
    ///
    /// Core errors carry their own user wording; with `verbose` the
    /// underlying cause is appended.
    pub fn report(&self, verbose: bool) -> String {
        match self {
            CliError::Core(e) => {
                let message = e.user_message();
                let detail = e.to_string();
                if verbose && detail != message {
                    format!("{message} ({detail})")
                } else {
                    message
                }
            }
            other => other.to_string(),
        }
    }
}
