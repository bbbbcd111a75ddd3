//! Runtime providers
//!
//! A [`Runtime`] produces root [`Context`]s for one hosting environment.
//! [`StandardRuntime`] covers the common environments through a
//! [`BootStrategy`]:
//!
//! - `Host`: the hosting application already runs an engine and a session;
//!   contexts reuse them and never shut the engine down
//! - `Container`: the engine is looked up in a [`ComponentContainer`]
//! - `Static`: the engine comes from a single factory
//!
//! For `Container` and `Static` every root context boots its own engine and
//! owns it.

mod registry;

pub use registry::{RuntimeSource, Runtimes};

use crate::context::Context;
use crate::overrides::Overrides;
use crate::settings::SettingsResolver;
use crate::{Error, Result};
use depctx_engine::{RepositoryEngine, Session};
use depctx_model::RemoteRepository;
use std::fmt;
use std::sync::Arc;

/// Produces contexts for one hosting environment
pub trait Runtime: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    /// Lower values are preferred
    fn priority(&self) -> i32;

    /// Whether this runtime boots (and owns) its engine
    fn managed(&self) -> bool;

    fn create(self: Arc<Self>, overrides: Overrides) -> Result<Context>;

    fn create_default(self: Arc<Self>) -> Result<Context> {
        self.create(Overrides::default())
    }
}

impl fmt::Debug for dyn Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("managed", &self.managed())
            .finish()
    }
}

/// Creates a repository engine
pub type EngineFactory = Arc<dyn Fn() -> Result<Arc<dyn RepositoryEngine>> + Send + Sync>;

/// Named engine factories, consulted in registration order.
///
/// The first factory that delivers an engine wins; failures of earlier
/// factories are logged and skipped.
#[derive(Clone, Default)]
pub struct ComponentContainer {
    factories: Vec<(String, EngineFactory)>,
}

impl ComponentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn RepositoryEngine>> + Send + Sync + 'static,
    {
        self.factories.push((name.into(), Arc::new(factory)));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn lookup(&self) -> Result<(String, Arc<dyn RepositoryEngine>)> {
        let mut tried = Vec::with_capacity(self.factories.len());
        for (name, factory) in &self.factories {
            match factory() {
                Ok(engine) => {
                    tracing::debug!(component = %name, "Repository engine delivered");
                    return Ok((name.clone(), engine));
                }
                Err(e) => {
                    tracing::warn!(component = %name, error = %e, "Repository engine component failed");
                    tried.push(name.clone());
                }
            }
        }
        Err(Error::NoEngine { tried })
    }
}

impl fmt::Debug for ComponentContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContainer")
            .field("factories", &self.names())
            .finish()
    }
}

/// How a runtime obtains its engine
#[derive(Clone)]
pub enum BootStrategy {
    Host {
        engine: Arc<dyn RepositoryEngine>,
        session: Session,
        repositories: Vec<RemoteRepository>,
    },
    Container(ComponentContainer),
    Static(EngineFactory),
}

impl BootStrategy {
    pub fn static_engine<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn RepositoryEngine>> + Send + Sync + 'static,
    {
        Self::Static(Arc::new(factory))
    }

    pub fn is_managed(&self) -> bool {
        !matches!(self, Self::Host { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Host { .. } => "host",
            Self::Container(_) => "container",
            Self::Static(_) => "static",
        }
    }
}

impl fmt::Debug for BootStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(container) => f.debug_tuple("Container").field(container).finish(),
            other => f.write_str(other.label()),
        }
    }
}

/// Runtime driven by a [`BootStrategy`]
#[derive(Debug, Clone)]
pub struct StandardRuntime {
    name: String,
    priority: i32,
    strategy: BootStrategy,
    settings_resolver: SettingsResolver,
}

impl StandardRuntime {
    pub fn new(name: impl Into<String>, priority: i32, strategy: BootStrategy) -> Self {
        Self {
            name: name.into(),
            priority,
            strategy,
            settings_resolver: SettingsResolver::default(),
        }
    }

    #[must_use]
    pub fn with_settings_resolver(mut self, resolver: SettingsResolver) -> Self {
        self.settings_resolver = resolver;
        self
    }

    pub fn strategy(&self) -> &BootStrategy {
        &self.strategy
    }

    fn boot(&self) -> Result<Arc<dyn RepositoryEngine>> {
        match &self.strategy {
            BootStrategy::Container(container) => container.lookup().map(|(_, engine)| engine),
            BootStrategy::Static(factory) => factory(),
            BootStrategy::Host { engine, .. } => Ok(Arc::clone(engine)),
        }
    }
}

impl Runtime for StandardRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn managed(&self) -> bool {
        self.strategy.is_managed()
    }

    fn create(self: Arc<Self>, overrides: Overrides) -> Result<Context> {
        tracing::debug!(runtime = %self.name, strategy = self.strategy.label(), "Creating context");

        if let BootStrategy::Host {
            engine,
            session,
            repositories,
        } = &self.strategy
        {
            let (engine, session, repositories) =
                (Arc::clone(engine), session.clone(), repositories.clone());
            let runtime: Arc<dyn Runtime> = self;
            let host = Context::hosted(runtime, engine, session, repositories);
            return host.customize(overrides);
        }

        let engine = self.boot()?;
        let resolver = self.settings_resolver.clone();
        let runtime: Arc<dyn Runtime> = self;
        Context::assemble(runtime, Arc::clone(&engine), true, overrides, &resolver).inspect_err(
            |e| {
                tracing::debug!(error = %e, "Context build failed, shutting engine down");
                engine.shutdown();
            },
        )
    }
}
