//! Error types for depctx-model

use std::path::PathBuf;

/// Result type for depctx-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or interpreting model data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file exists but is not valid
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    #[error("Invalid artifact coordinates: {coords}")]
    InvalidCoordinates { coords: String },

    #[error("Invalid repository policy: {value}")]
    InvalidPolicy { value: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
