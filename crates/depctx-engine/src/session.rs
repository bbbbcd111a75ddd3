//! Immutable session state handed to the repository engine

use crate::listener::{RepositoryListener, TransferListener};
use crate::local::LocalRepositoryManager;
use crate::selector::{
    AuthenticationSelector, DefaultAuthenticationSelector, DefaultMirrorSelector,
    DefaultProxySelector, MirrorSelector, ProxySelector,
};
use depctx_model::{ChecksumPolicy, UpdatePolicy};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Session configuration for resolutions.
///
/// Sessions are values: every `with_*` method consumes the session and
/// returns a modified copy, so two sessions derived from the same parent
/// never observe each other's changes. Heavy members are shared through
/// `Arc` and cloning is cheap.
#[derive(Clone)]
pub struct Session {
    offline: bool,
    local_repository_manager: Arc<dyn LocalRepositoryManager>,
    checksum_policy: Option<ChecksumPolicy>,
    update_policy: Option<UpdatePolicy>,
    system_properties: BTreeMap<String, String>,
    user_properties: BTreeMap<String, String>,
    config_properties: BTreeMap<String, String>,
    mirror_selector: Arc<dyn MirrorSelector>,
    proxy_selector: Arc<dyn ProxySelector>,
    authentication_selector: Arc<dyn AuthenticationSelector>,
    transfer_listener: Option<Arc<dyn TransferListener>>,
    repository_listener: Option<Arc<dyn RepositoryListener>>,
}

impl Session {
    /// Online session with empty selectors and no listeners
    pub fn new(local_repository_manager: Arc<dyn LocalRepositoryManager>) -> Self {
        Self {
            offline: false,
            local_repository_manager,
            checksum_policy: None,
            update_policy: None,
            system_properties: BTreeMap::new(),
            user_properties: BTreeMap::new(),
            config_properties: BTreeMap::new(),
            mirror_selector: Arc::new(DefaultMirrorSelector::new()),
            proxy_selector: Arc::new(DefaultProxySelector::new()),
            authentication_selector: Arc::new(DefaultAuthenticationSelector::new()),
            transfer_listener: None,
            repository_listener: None,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn local_repository_manager(&self) -> &Arc<dyn LocalRepositoryManager> {
        &self.local_repository_manager
    }

    /// Session-wide checksum policy, overriding repository policies when set
    pub fn checksum_policy(&self) -> Option<ChecksumPolicy> {
        self.checksum_policy
    }

    /// Session-wide update policy, overriding repository policies when set
    pub fn update_policy(&self) -> Option<UpdatePolicy> {
        self.update_policy
    }

    pub fn system_properties(&self) -> &BTreeMap<String, String> {
        &self.system_properties
    }

    pub fn user_properties(&self) -> &BTreeMap<String, String> {
        &self.user_properties
    }

    pub fn config_properties(&self) -> &BTreeMap<String, String> {
        &self.config_properties
    }

    /// Look a property up: user properties win over config, config over system.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.user_properties
            .get(key)
            .or_else(|| self.config_properties.get(key))
            .or_else(|| self.system_properties.get(key))
            .map(String::as_str)
    }

    pub fn mirror_selector(&self) -> &Arc<dyn MirrorSelector> {
        &self.mirror_selector
    }

    pub fn proxy_selector(&self) -> &Arc<dyn ProxySelector> {
        &self.proxy_selector
    }

    pub fn authentication_selector(&self) -> &Arc<dyn AuthenticationSelector> {
        &self.authentication_selector
    }

    pub fn transfer_listener(&self) -> Option<&Arc<dyn TransferListener>> {
        self.transfer_listener.as_ref()
    }

    pub fn repository_listener(&self) -> Option<&Arc<dyn RepositoryListener>> {
        self.repository_listener.as_ref()
    }

    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    #[must_use]
    pub fn with_local_repository_manager(
        mut self,
        manager: Arc<dyn LocalRepositoryManager>,
    ) -> Self {
        self.local_repository_manager = manager;
        self
    }

    #[must_use]
    pub fn with_checksum_policy(mut self, policy: Option<ChecksumPolicy>) -> Self {
        self.checksum_policy = policy;
        self
    }

    #[must_use]
    pub fn with_update_policy(mut self, policy: Option<UpdatePolicy>) -> Self {
        self.update_policy = policy;
        self
    }

    #[must_use]
    pub fn with_system_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.system_properties = properties;
        self
    }

    #[must_use]
    pub fn with_user_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.user_properties = properties;
        self
    }

    #[must_use]
    pub fn with_config_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.config_properties = properties;
        self
    }

    #[must_use]
    pub fn with_mirror_selector(mut self, selector: Arc<dyn MirrorSelector>) -> Self {
        self.mirror_selector = selector;
        self
    }

    #[must_use]
    pub fn with_proxy_selector(mut self, selector: Arc<dyn ProxySelector>) -> Self {
        self.proxy_selector = selector;
        self
    }

    #[must_use]
    pub fn with_authentication_selector(
        mut self,
        selector: Arc<dyn AuthenticationSelector>,
    ) -> Self {
        self.authentication_selector = selector;
        self
    }

    #[must_use]
    pub fn with_transfer_listener(mut self, listener: Option<Arc<dyn TransferListener>>) -> Self {
        self.transfer_listener = listener;
        self
    }

    #[must_use]
    pub fn with_repository_listener(
        mut self,
        listener: Option<Arc<dyn RepositoryListener>>,
    ) -> Self {
        self.repository_listener = listener;
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("offline", &self.offline)
            .field("local_repository", &self.local_repository_manager.base_dir())
            .field("checksum_policy", &self.checksum_policy)
            .field("update_policy", &self.update_policy)
            .field("user_properties", &self.user_properties)
            .field("transfer_listener", &self.transfer_listener.is_some())
            .field("repository_listener", &self.repository_listener.is_some())
            .finish_non_exhaustive()
    }
}
