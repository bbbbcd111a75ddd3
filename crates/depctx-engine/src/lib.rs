//! Repository engine boundary.
//!
//! The context-resolution core never resolves anything itself. It assembles a
//! [`Session`] and a repository list and hands them to a [`RepositoryEngine`].
//! This crate defines that boundary:
//!
//! - [`RepositoryEngine`]: resolution, local repository managers, repository
//!   aggregation and shutdown
//! - [`Session`]: immutable, cheaply clonable session state
//! - [`LocalRepositoryManager`]: on-disk artifact cache access
//! - selectors consulted at connection time (mirrors, proxies, credentials)
//! - listeners receiving transfer and repository events
//!
//! [`FileRepositoryEngine`] is a self-contained engine serving the local
//! cache and `file://` remote repositories.

pub mod engine;
pub mod error;
pub mod file_engine;
pub mod listener;
pub mod local;
pub mod selector;
pub mod session;

pub use engine::{ArtifactRequest, ArtifactResult, RepositoryEngine, aggregate_repositories};
pub use error::{Error, ResolutionError, Result};
pub use file_engine::FileRepositoryEngine;
pub use listener::{
    ChainedRepositoryListener, ChainedTransferListener, RepositoryEvent, RepositoryListener,
    TransferEvent, TransferListener,
};
pub use local::{LocalArtifactResult, LocalRepositoryManager, SimpleLocalRepositoryManager};
pub use selector::{
    AuthenticationSelector, DefaultAuthenticationSelector, DefaultMirrorSelector,
    DefaultProxySelector, MirrorSelector, ProxySelector,
};
pub use session::Session;
