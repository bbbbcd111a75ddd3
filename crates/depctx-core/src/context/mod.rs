//! Resolved dependency-resolution contexts
//!
//! A [`Context`] bundles the session, the repository engine and the remote
//! repository list produced by a runtime. Root contexts come from
//! [`Runtime::create`]; [`Context::customize`] derives further contexts that
//! share the parent's engine.
//!
//! Exactly one context per engine lifetime owns the engine. Closing (or
//! dropping) that context shuts the engine down; closing any other context
//! leaves it untouched.

mod summary;

pub use summary::{ContextSummary, RepositorySummary};

use crate::local::LocalRepositoryChain;
use crate::overrides::Overrides;
use crate::repositories;
use crate::runtime::Runtime;
use crate::settings::{ResolvedSettings, SettingsResolver, locations};
use crate::{Error, Result, properties};
use depctx_engine::{
    ArtifactRequest, ArtifactResult, ChainedRepositoryListener, ChainedTransferListener,
    RepositoryEngine, Session,
};
use depctx_model::{Artifact, RemoteRepository};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Context {
    runtime: Arc<dyn Runtime>,
    overrides: Overrides,
    session: Session,
    engine: Arc<dyn RepositoryEngine>,
    repositories: Vec<RemoteRepository>,
    active_profiles: Vec<String>,
    owns_engine: bool,
    released: AtomicBool,
}

impl Context {
    /// Context around a host-managed engine and session; never owns the engine.
    pub(crate) fn hosted(
        runtime: Arc<dyn Runtime>,
        engine: Arc<dyn RepositoryEngine>,
        session: Session,
        repositories: Vec<RemoteRepository>,
    ) -> Self {
        Self {
            runtime,
            overrides: Overrides::default(),
            session,
            engine,
            repositories,
            active_profiles: Vec::new(),
            owns_engine: false,
            released: AtomicBool::new(false),
        }
    }

    /// Build a root context from scratch.
    ///
    /// Layers, lowest precedence first: built-in defaults, host properties,
    /// discovered settings with their active profiles, then `overrides`.
    pub(crate) fn assemble(
        runtime: Arc<dyn Runtime>,
        engine: Arc<dyn RepositoryEngine>,
        owns_engine: bool,
        overrides: Overrides,
        settings_resolver: &SettingsResolver,
    ) -> Result<Self> {
        let resolved = settings_resolver.resolve(&overrides)?;

        let profile_properties = resolved.profile_properties();
        let mut user_properties = overrides.user_properties().clone();
        for (key, value) in &profile_properties {
            user_properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        let effective = properties::merge(overrides.system_properties(), &user_properties);

        let local_repository = local_repository_path(&overrides, &resolved, &effective)?;
        let local_repository_manager =
            LocalRepositoryChain::from_properties(&local_repository, &effective).build(engine.as_ref())?;

        let session = Session::new(local_repository_manager)
            .with_offline(overrides.offline() || resolved.is_offline())
            .with_checksum_policy(overrides.checksum_policy())
            .with_update_policy(overrides.snapshot_update_policy().map(Into::into))
            .with_system_properties(overrides.system_properties().clone())
            .with_user_properties(user_properties)
            .with_config_properties(profile_properties)
            .with_mirror_selector(Arc::new(resolved.selectors.mirrors.clone()))
            .with_proxy_selector(Arc::new(resolved.selectors.proxies.clone()))
            .with_authentication_selector(Arc::new(resolved.selectors.authentication.clone()))
            .with_transfer_listener(overrides.transfer_listener().cloned())
            .with_repository_listener(overrides.repository_listener().cloned());

        let mut discovered = resolved.profile_repositories();
        if discovered.is_empty() {
            discovered.push(RemoteRepository::central());
        }
        let composed = repositories::compose(
            &discovered,
            overrides.repositories(),
            overrides.add_repositories_op(),
        );
        let repositories = engine.new_resolution_repositories(&session, &composed);

        tracing::info!(
            runtime = %runtime.name(),
            local_repository = %local_repository.display(),
            offline = session.is_offline(),
            repositories = repositories.len(),
            "Created context"
        );
        Ok(Self {
            runtime,
            overrides,
            session,
            engine,
            repositories,
            active_profiles: resolved.active_profile_ids(),
            owns_engine,
            released: AtomicBool::new(false),
        })
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// Overrides this context was created or customized with
    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &Arc<dyn RepositoryEngine> {
        &self.engine
    }

    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    pub fn active_profiles(&self) -> &[String] {
        &self.active_profiles
    }

    pub fn owns_engine(&self) -> bool {
        self.owns_engine
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn local_repository(&self) -> &Path {
        self.session.local_repository_manager().base_dir()
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.is_released() || self.engine.is_shutdown() {
            return Err(Error::ContextReleased {
                runtime: self.runtime.name().to_string(),
            });
        }
        Ok(())
    }

    /// Derive a context layering `overrides` over this one.
    ///
    /// The derived context shares the engine but never owns it:
    /// - offline if either side is offline
    /// - user properties of `overrides` overlay the inherited ones
    /// - the local repository changes only when the requested path differs
    /// - policies and listeners apply only when set; new listeners are
    ///   chained after inherited ones
    /// - repositories are combined per the override's composition policy,
    ///   with this context's list as the discovered side
    pub fn customize(&self, overrides: Overrides) -> Result<Context> {
        self.ensure_usable()?;

        let mut user_properties = self.session.user_properties().clone();
        user_properties.extend(
            overrides
                .user_properties()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        let mut session = self
            .session
            .clone()
            .with_offline(self.session.is_offline() || overrides.offline())
            .with_user_properties(user_properties);

        if let Some(path) = overrides.local_repository() {
            if path != self.local_repository() {
                let effective = properties::merge(session.system_properties(), session.user_properties());
                let manager =
                    LocalRepositoryChain::from_properties(path, &effective).build(self.engine.as_ref())?;
                tracing::debug!(path = %path.display(), "Switching local repository");
                session = session.with_local_repository_manager(manager);
            }
        }
        if let Some(policy) = overrides.checksum_policy() {
            session = session.with_checksum_policy(Some(policy));
        }
        if let Some(policy) = overrides.snapshot_update_policy() {
            session = session.with_update_policy(Some(policy.into()));
        }
        if let Some(listener) = overrides.transfer_listener() {
            let chained = ChainedTransferListener::chain(
                session.transfer_listener().cloned(),
                Arc::clone(listener),
            );
            session = session.with_transfer_listener(Some(chained));
        }
        if let Some(listener) = overrides.repository_listener() {
            let chained = ChainedRepositoryListener::chain(
                session.repository_listener().cloned(),
                Arc::clone(listener),
            );
            session = session.with_repository_listener(Some(chained));
        }

        let added = self
            .engine
            .new_resolution_repositories(&session, overrides.repositories());
        let repositories =
            repositories::compose(&self.repositories, &added, overrides.add_repositories_op());

        tracing::debug!(
            runtime = %self.runtime.name(),
            repositories = repositories.len(),
            "Customized context"
        );
        Ok(Context {
            runtime: Arc::clone(&self.runtime),
            overrides,
            session,
            engine: Arc::clone(&self.engine),
            repositories,
            active_profiles: self.active_profiles.clone(),
            owns_engine: false,
            released: AtomicBool::new(false),
        })
    }

    /// Resolve one artifact against this context's repositories.
    ///
    /// Engine failures are returned unchanged as [`Error::Resolution`].
    pub fn resolve(&self, artifact: &Artifact) -> Result<ArtifactResult> {
        self.ensure_usable()?;
        let request = ArtifactRequest::new(artifact.clone(), self.repositories.clone())
            .with_context(self.runtime.name());
        Ok(self.engine.resolve(&self.session, &request)?)
    }

    /// Release this context.
    ///
    /// Shuts the engine down when this context owns it. Further calls do
    /// nothing.
    pub fn close(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.owns_engine {
            tracing::info!(runtime = %self.runtime.name(), "Shutting down repository engine");
            self.engine.shutdown();
        } else {
            tracing::debug!(runtime = %self.runtime.name(), "Released derived context");
        }
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            runtime: self.runtime.name().to_string(),
            managed: self.runtime.managed(),
            owns_engine: self.owns_engine,
            offline: self.session.is_offline(),
            local_repository: self.local_repository().to_path_buf(),
            repositories: self
                .repositories
                .iter()
                .map(|r| RepositorySummary {
                    id: r.id.clone(),
                    url: r.url.clone(),
                    mirrored: r.mirrored.iter().map(|m| m.id.clone()).collect(),
                })
                .collect(),
            active_profiles: self.active_profiles.clone(),
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("runtime", &self.runtime.name())
            .field("session", &self.session)
            .field("repositories", &self.repositories)
            .field("active_profiles", &self.active_profiles)
            .field("owns_engine", &self.owns_engine)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// Explicit override, else settings, else `${user.home}/.m2/repository`.
fn local_repository_path(
    overrides: &Overrides,
    resolved: &ResolvedSettings,
    properties: &std::collections::BTreeMap<String, String>,
) -> Result<PathBuf> {
    let path = overrides
        .local_repository()
        .map(Path::to_path_buf)
        .or_else(|| resolved.local_repository())
        .or_else(|| locations::default_local_repository(properties))
        .ok_or(Error::LocalRepositoryUnknown)?;
    Ok(dunce::simplified(&path).to_path_buf())
}
