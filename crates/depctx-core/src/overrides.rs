//! Caller-supplied configuration deltas
//!
//! [`Overrides`] describes what the caller wants to change relative to the
//! defaults and to discovered settings. It is immutable once built; use
//! [`Overrides::to_builder`] to derive a modified copy.
//!
//! Defaults are filled in by [`OverridesBuilder::build`], not by the setters,
//! so the order in which setters are called never matters.
//!
//! # Example
//!
//! ```
//! use depctx_core::{AddRepositoriesOp, Overrides};
//! use depctx_model::RemoteRepository;
//!
//! let overrides = Overrides::builder()
//!     .offline(true)
//!     .local_repository(Some("/tmp/repository".into()))
//!     .repositories(vec![RemoteRepository::new("internal", "https://repo.internal/")])
//!     .add_repositories_op(AddRepositoriesOp::Prepend)
//!     .build();
//!
//! assert!(overrides.offline());
//! assert_eq!(overrides.to_builder().build(), overrides);
//! ```

use crate::properties;
use depctx_engine::{RepositoryListener, TransferListener};
use depctx_model::{ChecksumPolicy, RemoteRepository, SnapshotUpdatePolicy};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How an explicit repository list combines with discovered repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddRepositoriesOp {
    /// Use only the explicit list (unless it is empty)
    Replace,
    /// Discovered repositories first, then the explicit list
    #[default]
    Append,
    /// Explicit list first, then discovered repositories
    Prepend,
}

/// Immutable description of caller overrides
#[derive(Clone)]
pub struct Overrides {
    offline: bool,
    local_repository: Option<PathBuf>,
    repositories: Vec<RemoteRepository>,
    add_repositories_op: AddRepositoriesOp,
    checksum_policy: Option<ChecksumPolicy>,
    snapshot_update_policy: Option<SnapshotUpdatePolicy>,
    with_user_settings: bool,
    global_settings: Option<PathBuf>,
    user_settings: Option<PathBuf>,
    settings_security: Option<PathBuf>,
    active_profile_ids: Vec<String>,
    inactive_profile_ids: Vec<String>,
    system_properties: BTreeMap<String, String>,
    user_properties: BTreeMap<String, String>,
    transfer_listener: Option<Arc<dyn TransferListener>>,
    repository_listener: Option<Arc<dyn RepositoryListener>>,
}

impl Overrides {
    pub fn builder() -> OverridesBuilder {
        OverridesBuilder::default()
    }

    /// A builder pre-populated with every value of this instance.
    pub fn to_builder(&self) -> OverridesBuilder {
        OverridesBuilder {
            offline: self.offline,
            local_repository: self.local_repository.clone(),
            repositories: self.repositories.clone(),
            add_repositories_op: self.add_repositories_op,
            checksum_policy: self.checksum_policy,
            snapshot_update_policy: self.snapshot_update_policy,
            with_user_settings: self.with_user_settings,
            global_settings: self.global_settings.clone(),
            user_settings: self.user_settings.clone(),
            settings_security: self.settings_security.clone(),
            active_profile_ids: self.active_profile_ids.clone(),
            inactive_profile_ids: self.inactive_profile_ids.clone(),
            system_properties: Some(self.system_properties.clone()),
            user_properties: Some(self.user_properties.clone()),
            transfer_listener: self.transfer_listener.clone(),
            repository_listener: self.repository_listener.clone(),
        }
    }

    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn local_repository(&self) -> Option<&Path> {
        self.local_repository.as_deref()
    }

    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    pub fn add_repositories_op(&self) -> AddRepositoriesOp {
        self.add_repositories_op
    }

    pub fn checksum_policy(&self) -> Option<ChecksumPolicy> {
        self.checksum_policy
    }

    pub fn snapshot_update_policy(&self) -> Option<SnapshotUpdatePolicy> {
        self.snapshot_update_policy
    }

    /// Whether discovered settings files are read at all
    pub fn with_user_settings(&self) -> bool {
        self.with_user_settings
    }

    pub fn global_settings(&self) -> Option<&Path> {
        self.global_settings.as_deref()
    }

    pub fn user_settings(&self) -> Option<&Path> {
        self.user_settings.as_deref()
    }

    pub fn settings_security(&self) -> Option<&Path> {
        self.settings_security.as_deref()
    }

    pub fn active_profile_ids(&self) -> &[String] {
        &self.active_profile_ids
    }

    pub fn inactive_profile_ids(&self) -> &[String] {
        &self.inactive_profile_ids
    }

    pub fn system_properties(&self) -> &BTreeMap<String, String> {
        &self.system_properties
    }

    pub fn user_properties(&self) -> &BTreeMap<String, String> {
        &self.user_properties
    }

    /// System properties overlaid with user properties.
    pub fn effective_properties(&self) -> BTreeMap<String, String> {
        properties::merge(&self.system_properties, &self.user_properties)
    }

    pub fn transfer_listener(&self) -> Option<&Arc<dyn TransferListener>> {
        self.transfer_listener.as_ref()
    }

    pub fn repository_listener(&self) -> Option<&Arc<dyn RepositoryListener>> {
        self.repository_listener.as_ref()
    }
}

impl Default for Overrides {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn same_listener<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for Overrides {
    fn eq(&self, other: &Self) -> bool {
        self.offline == other.offline
            && self.local_repository == other.local_repository
            && self.repositories == other.repositories
            && self.add_repositories_op == other.add_repositories_op
            && self.checksum_policy == other.checksum_policy
            && self.snapshot_update_policy == other.snapshot_update_policy
            && self.with_user_settings == other.with_user_settings
            && self.global_settings == other.global_settings
            && self.user_settings == other.user_settings
            && self.settings_security == other.settings_security
            && self.active_profile_ids == other.active_profile_ids
            && self.inactive_profile_ids == other.inactive_profile_ids
            && self.system_properties == other.system_properties
            && self.user_properties == other.user_properties
            && same_listener(&self.transfer_listener, &other.transfer_listener)
            && same_listener(&self.repository_listener, &other.repository_listener)
    }
}

impl Eq for Overrides {}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("offline", &self.offline)
            .field("local_repository", &self.local_repository)
            .field("repositories", &self.repositories)
            .field("add_repositories_op", &self.add_repositories_op)
            .field("checksum_policy", &self.checksum_policy)
            .field("snapshot_update_policy", &self.snapshot_update_policy)
            .field("with_user_settings", &self.with_user_settings)
            .field("global_settings", &self.global_settings)
            .field("user_settings", &self.user_settings)
            .field("settings_security", &self.settings_security)
            .field("active_profile_ids", &self.active_profile_ids)
            .field("inactive_profile_ids", &self.inactive_profile_ids)
            .field("user_properties", &self.user_properties)
            .field("transfer_listener", &self.transfer_listener.is_some())
            .field("repository_listener", &self.repository_listener.is_some())
            .finish_non_exhaustive()
    }
}

/// Staged builder for [`Overrides`]
#[derive(Clone, Default)]
pub struct OverridesBuilder {
    offline: bool,
    local_repository: Option<PathBuf>,
    repositories: Vec<RemoteRepository>,
    add_repositories_op: AddRepositoriesOp,
    checksum_policy: Option<ChecksumPolicy>,
    snapshot_update_policy: Option<SnapshotUpdatePolicy>,
    with_user_settings: bool,
    global_settings: Option<PathBuf>,
    user_settings: Option<PathBuf>,
    settings_security: Option<PathBuf>,
    active_profile_ids: Vec<String>,
    inactive_profile_ids: Vec<String>,
    system_properties: Option<BTreeMap<String, String>>,
    user_properties: Option<BTreeMap<String, String>>,
    transfer_listener: Option<Arc<dyn TransferListener>>,
    repository_listener: Option<Arc<dyn RepositoryListener>>,
}

impl OverridesBuilder {
    #[must_use]
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Explicit local repository; `None` clears a previous value.
    #[must_use]
    pub fn local_repository(mut self, path: Option<PathBuf>) -> Self {
        self.local_repository = path;
        self
    }

    #[must_use]
    pub fn repositories(mut self, repositories: Vec<RemoteRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    #[must_use]
    pub fn add_repositories_op(mut self, op: AddRepositoriesOp) -> Self {
        self.add_repositories_op = op;
        self
    }

    #[must_use]
    pub fn checksum_policy(mut self, policy: Option<ChecksumPolicy>) -> Self {
        self.checksum_policy = policy;
        self
    }

    #[must_use]
    pub fn snapshot_update_policy(mut self, policy: Option<SnapshotUpdatePolicy>) -> Self {
        self.snapshot_update_policy = policy;
        self
    }

    #[must_use]
    pub fn with_user_settings(mut self, enabled: bool) -> Self {
        self.with_user_settings = enabled;
        self
    }

    #[must_use]
    pub fn global_settings(mut self, path: Option<PathBuf>) -> Self {
        self.global_settings = path;
        self
    }

    #[must_use]
    pub fn user_settings(mut self, path: Option<PathBuf>) -> Self {
        self.user_settings = path;
        self
    }

    #[must_use]
    pub fn settings_security(mut self, path: Option<PathBuf>) -> Self {
        self.settings_security = path;
        self
    }

    #[must_use]
    pub fn active_profile_ids(mut self, ids: Vec<String>) -> Self {
        self.active_profile_ids = ids;
        self
    }

    #[must_use]
    pub fn inactive_profile_ids(mut self, ids: Vec<String>) -> Self {
        self.inactive_profile_ids = ids;
        self
    }

    #[must_use]
    pub fn system_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.system_properties = Some(properties);
        self
    }

    #[must_use]
    pub fn user_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.user_properties = Some(properties);
        self
    }

    #[must_use]
    pub fn transfer_listener(mut self, listener: Option<Arc<dyn TransferListener>>) -> Self {
        self.transfer_listener = listener;
        self
    }

    #[must_use]
    pub fn repository_listener(mut self, listener: Option<Arc<dyn RepositoryListener>>) -> Self {
        self.repository_listener = listener;
        self
    }

    /// Finalize, filling in defaults.
    ///
    /// - system properties default to the host's environment and system
    ///   properties, user properties to empty
    /// - without an explicit local repository, `maven.repo.local` from the
    ///   merged properties is used when present
    pub fn build(self) -> Overrides {
        let system_properties = self
            .system_properties
            .unwrap_or_else(properties::host_system_properties);
        let user_properties = self.user_properties.unwrap_or_default();

        let local_repository = self.local_repository.or_else(|| {
            let merged = properties::merge(&system_properties, &user_properties);
            properties::non_blank(&merged, properties::LOCAL_REPOSITORY).map(PathBuf::from)
        });

        Overrides {
            offline: self.offline,
            local_repository,
            repositories: self.repositories,
            add_repositories_op: self.add_repositories_op,
            checksum_policy: self.checksum_policy,
            snapshot_update_policy: self.snapshot_update_policy,
            with_user_settings: self.with_user_settings,
            global_settings: self.global_settings,
            user_settings: self.user_settings,
            settings_security: self.settings_security,
            active_profile_ids: self.active_profile_ids,
            inactive_profile_ids: self.inactive_profile_ids,
            system_properties,
            user_properties,
            transfer_listener: self.transfer_listener,
            repository_listener: self.repository_listener,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let overrides = Overrides::builder().system_properties(BTreeMap::new()).build();
        assert!(!overrides.offline());
        assert!(!overrides.with_user_settings());
        assert_eq!(overrides.add_repositories_op(), AddRepositoriesOp::Append);
        assert!(overrides.local_repository().is_none());
        assert!(overrides.checksum_policy().is_none());
        assert!(overrides.user_properties().is_empty());
    }

    #[test]
    fn system_properties_default_to_host() {
        let overrides = Overrides::builder().build();
        assert!(overrides.system_properties().contains_key(properties::OS_NAME));
    }

    #[test]
    fn local_repository_from_properties() {
        let overrides = Overrides::builder()
            .system_properties(props(&[(properties::LOCAL_REPOSITORY, "/from/system")]))
            .build();
        assert_eq!(overrides.local_repository(), Some(Path::new("/from/system")));

        let overrides = Overrides::builder()
            .system_properties(props(&[(properties::LOCAL_REPOSITORY, "/from/system")]))
            .user_properties(props(&[(properties::LOCAL_REPOSITORY, "/from/user")]))
            .build();
        assert_eq!(overrides.local_repository(), Some(Path::new("/from/user")));
    }

    #[test]
    fn explicit_local_repository_wins_over_properties() {
        let overrides = Overrides::builder()
            .local_repository(Some("/explicit".into()))
            .system_properties(props(&[(properties::LOCAL_REPOSITORY, "/from/system")]))
            .build();
        assert_eq!(overrides.local_repository(), Some(Path::new("/explicit")));
    }

    #[test]
    fn setter_order_does_not_matter() {
        let a = Overrides::builder()
            .user_properties(props(&[(properties::LOCAL_REPOSITORY, "/p")]))
            .system_properties(BTreeMap::new())
            .offline(true)
            .build();
        let b = Overrides::builder()
            .offline(true)
            .system_properties(BTreeMap::new())
            .user_properties(props(&[(properties::LOCAL_REPOSITORY, "/p")]))
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn round_trip_default() {
        let original = Overrides::builder().build();
        assert_eq!(original.to_builder().build(), original);
    }

    #[test]
    fn round_trip_cleared_local_repository() {
        let original = Overrides::builder()
            .local_repository(Some("/tmp/explicit".into()))
            .local_repository(None)
            .system_properties(BTreeMap::new())
            .build();
        assert!(original.local_repository().is_none());
        assert_eq!(original.to_builder().build(), original);
    }

    #[test]
    fn derived_builder_copies() {
        let original = Overrides::builder()
            .system_properties(BTreeMap::new())
            .build();
        let changed = original.to_builder().offline(true).build();
        assert!(!original.offline());
        assert!(changed.offline());
        assert_ne!(original, changed);
    }

    #[test]
    fn listeners_compare_by_identity() {
        struct Quiet;
        impl TransferListener for Quiet {
            fn on_transfer(&self, _event: &depctx_engine::TransferEvent) {}
        }

        let listener: Arc<dyn TransferListener> = Arc::new(Quiet);
        let a = Overrides::builder()
            .system_properties(BTreeMap::new())
            .transfer_listener(Some(Arc::clone(&listener)))
            .build();
        assert_eq!(a.to_builder().build(), a);

        let b = a
            .to_builder()
            .transfer_listener(Some(Arc::new(Quiet)))
            .build();
        assert_ne!(a, b);
    }
}
