//! Registry of runtime providers

use super::Runtime;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Supplies runtimes when the registry is first queried while empty
pub type RuntimeSource = Arc<dyn Fn() -> Vec<Arc<dyn Runtime>> + Send + Sync>;

static GLOBAL: LazyLock<Runtimes> = LazyLock::new(Runtimes::new);

#[derive(Default)]
struct State {
    /// Ordered by priority, then registration order
    runtimes: Vec<Arc<dyn Runtime>>,
    names: BTreeSet<String>,
    sources: Vec<RuntimeSource>,
    discovered: bool,
}

impl State {
    fn insert(&mut self, runtime: Arc<dyn Runtime>) -> bool {
        if !self.names.insert(runtime.name().to_string()) {
            tracing::debug!(runtime = %runtime.name(), "Runtime already registered, ignoring");
            return false;
        }
        let position = self
            .runtimes
            .iter()
            .position(|r| r.priority() > runtime.priority())
            .unwrap_or(self.runtimes.len());
        tracing::info!(
            runtime = %runtime.name(),
            priority = runtime.priority(),
            "Registered runtime"
        );
        self.runtimes.insert(position, runtime);
        true
    }
}

/// Thread-safe catalogue of runtimes.
///
/// [`get_runtime`](Runtimes::get_runtime) returns the runtime with the lowest
/// priority value; equal priorities keep registration order. When nothing is
/// registered, the registered sources are consulted once. Sources are called
/// with the registry locked and must not call back into it.
///
/// Applications can own a registry or use the process-wide
/// [`Runtimes::global`] instance.
pub struct Runtimes {
    state: RwLock<State>,
}

impl Default for Runtimes {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtimes {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static Runtimes {
        &GLOBAL
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `runtime` unless one with the same name is present.
    ///
    /// Returns whether it was added.
    pub fn register_runtime(&self, runtime: Arc<dyn Runtime>) -> bool {
        self.write().insert(runtime)
    }

    /// Add a discovery source, consulted in registration order.
    pub fn register_source<F>(&self, source: F)
    where
        F: Fn() -> Vec<Arc<dyn Runtime>> + Send + Sync + 'static,
    {
        let mut state = self.write();
        state.sources.push(Arc::new(source));
        state.discovered = false;
    }

    /// The preferred runtime, discovering runtimes first if none are registered.
    pub fn get_runtime(&self) -> Result<Arc<dyn Runtime>> {
        if let Some(runtime) = self.read().runtimes.first() {
            return Ok(Arc::clone(runtime));
        }

        let mut state = self.write();
        if state.runtimes.is_empty() && !state.discovered {
            state.discovered = true;
            let sources = state.sources.clone();
            tracing::debug!(sources = sources.len(), "Discovering runtimes");
            for source in sources {
                for runtime in source() {
                    state.insert(runtime);
                }
            }
        }

        let runtime = state.runtimes.first().cloned().ok_or(Error::NoRuntime)?;
        tracing::info!(runtime = %runtime.name(), "Selected runtime");
        Ok(runtime)
    }

    /// Forget all runtimes so the next query discovers again.
    ///
    /// Sources stay registered.
    pub fn reset(&self) {
        let mut state = self.write();
        state.runtimes.clear();
        state.names.clear();
        state.discovered = false;
        tracing::debug!("Runtime registry reset");
    }

    /// Runtime names in selection order
    pub fn names(&self) -> Vec<String> {
        self.read()
            .runtimes
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().runtimes.is_empty()
    }
}

impl fmt::Debug for Runtimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtimes")
            .field("runtimes", &self.names())
            .finish_non_exhaustive()
    }
}
