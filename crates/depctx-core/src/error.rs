//! Error types for depctx-core

/// Result type for depctx-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of a failure, for callers deciding how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed settings, unusable local repository, boot failures
    Configuration,
    /// No runtime provider could be found
    ProviderAvailability,
    /// Failure reported by the repository engine
    Resolution,
    /// Use of a context after it was released
    Lifecycle,
}

/// Errors that can occur while resolving or using a context
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Nothing registered, and discovery found nothing either
    #[error("No runtime provider available")]
    NoRuntime,

    #[error("No repository engine could be booted (tried: {})", tried.join(", "))]
    NoEngine { tried: Vec<String> },

    #[error("Context of runtime {runtime} has been released")]
    ContextReleased { runtime: String },

    #[error("Cannot determine the local repository location: no override, settings entry or user home")]
    LocalRepositoryUnknown,

    /// Never returned from a context build; the entry is dropped instead
    #[error("Failed to decrypt {id}: {message}")]
    Decryption { id: String, message: String },

    #[error(transparent)]
    Model(#[from] depctx_model::Error),

    #[error(transparent)]
    Engine(#[from] depctx_engine::Error),

    #[error(transparent)]
    Resolution(#[from] depctx_engine::ResolutionError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRuntime => ErrorKind::ProviderAvailability,
            Self::ContextReleased { .. } => ErrorKind::Lifecycle,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::NoEngine { .. }
            | Self::LocalRepositoryUnknown
            | Self::Decryption { .. }
            | Self::Model(_)
            | Self::Engine(_) => ErrorKind::Configuration,
        }
    }
}
