//! Error types for roster-model

use std::path::PathBuf;

use crate::location::LookupError;
use crate::record::Field;

/// Result type for roster-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in roster-model operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field name that does not exist on a student record
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// A value rejected by the input rules of a field
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: Field, reason: String },

    /// A cascading field referenced a location absent from the hierarchy
    #[error(transparent)]
    InvalidLookup(#[from] LookupError),

    /// Location reference data could not be read
    #[error("Failed to read location data at {path}: {source}")]
    LocationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Location reference data could not be parsed
    #[error("Failed to parse location data: {0}")]
    LocationParse(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_value(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
