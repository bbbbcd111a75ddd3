//! Plain data model shared by the context-resolution crates.
//!
//! This crate carries no behavior beyond parsing and merging:
//!
//! - **Artifacts**: GAV coordinates with classifier and extension
//! - **Repositories**: remote repository descriptors and their policies
//! - **Settings**: the on-disk settings model (servers, mirrors, proxies,
//!   profiles) and the TOML parser used by the default settings builder

pub mod artifact;
pub mod error;
pub mod repository;
pub mod settings;

pub use artifact::Artifact;
pub use error::{Error, Result};
pub use repository::{
    Authentication, ChecksumPolicy, Proxy, RemoteRepository, RepositoryPolicy,
    SnapshotUpdatePolicy, UpdatePolicy,
};
pub use settings::{
    Activation, ActivationFile, ActivationOs, ActivationProperty, Mirror, PolicySettings,
    Profile, ProxySettings, RepositorySettings, Server, Settings,
};
