//! Context resolution for dependency-resolution sessions.
//!
//! Application code asks for a ready-to-use [`Context`]: a session, a
//! repository engine and a remote repository list. Which engine is used and
//! how configuration is layered depends on the hosting environment, which is
//! represented by a [`Runtime`] registered in [`Runtimes`].
//!
//! # Example
//!
//! ```no_run
//! use depctx_core::{BootStrategy, Overrides, Runtime, Runtimes, StandardRuntime};
//! use depctx_engine::{FileRepositoryEngine, RepositoryEngine};
//! use depctx_model::Artifact;
//! use std::sync::Arc;
//!
//! let runtimes = Runtimes::new();
//! runtimes.register_runtime(Arc::new(StandardRuntime::new(
//!     "standalone",
//!     10,
//!     BootStrategy::static_engine(|| {
//!         Ok(Arc::new(FileRepositoryEngine::new()) as Arc<dyn RepositoryEngine>)
//!     }),
//! )));
//!
//! let context = runtimes
//!     .get_runtime()?
//!     .create(Overrides::builder().offline(true).build())?;
//! let result = context.resolve(&Artifact::parse("org.example:lib:1.0")?)?;
//! println!("{}", result.file.display());
//! # Ok::<(), depctx_core::Error>(())
//! ```

pub mod context;
pub mod error;
pub mod local;
pub mod logging;
pub mod overrides;
pub mod properties;
pub mod repositories;
pub mod runtime;
pub mod settings;

pub use context::{Context, ContextSummary, RepositorySummary};
pub use error::{Error, ErrorKind, Result};
pub use local::{ChainedLocalRepositoryManager, LocalRepositoryChain};
pub use overrides::{AddRepositoriesOp, Overrides, OverridesBuilder};
pub use runtime::{
    BootStrategy, ComponentContainer, EngineFactory, Runtime, RuntimeSource, Runtimes,
    StandardRuntime,
};
pub use settings::{
    ActivationContext, DefaultProfileSelector, PlainTextDecrypter, ProfileSelector,
    ResolvedSettings, SettingsBuilder, SettingsDecrypter, SettingsLocations, SettingsRequest,
    SettingsResolver, SettingsSelectors, TomlSettingsBuilder,
};
