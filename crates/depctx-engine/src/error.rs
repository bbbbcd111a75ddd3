//! Error types for depctx-engine

use std::path::PathBuf;

/// Result type for depctx-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine failures unrelated to a particular resolution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid local repository at {path}: {message}")]
    LocalRepository { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of a single artifact resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Could not find artifact {artifact} in {}", repositories.join(", "))]
    NotFound {
        artifact: String,
        repositories: Vec<String>,
    },

    #[error("Cannot access {repository} in offline mode and artifact {artifact} has not been downloaded from it before")]
    Offline { artifact: String, repository: String },

    #[error("No transport available for {repository} ({url})")]
    TransportUnavailable { repository: String, url: String },

    #[error("Repository {repository} is blocked")]
    Blocked { repository: String },

    #[error("Repository engine has been shut down")]
    Shutdown,

    #[error("Failed to store artifact: {0}")]
    Storage(#[from] Error),
}
