//! Settings model parsed from `settings.toml`
//!
//! A settings file carries the user's (or the installation's) view of the
//! repository world: where the local repository lives, credentials for
//! servers, mirrors, proxies, and conditionally activated profiles.
//!
//! # Example TOML
//!
//! ```toml
//! local-repository = "/srv/cache/repository"
//! active-profiles = ["corporate"]
//!
//! [[servers]]
//! id = "corporate"
//! username = "deployer"
//! password = "secret"
//!
//! [[mirrors]]
//! id = "corporate"
//! url = "https://nexus.example.com/repository/public/"
//! mirror-of = "external:*"
//!
//! [[proxies]]
//! host = "proxy.example.com"
//! port = 3128
//! non-proxy-hosts = "localhost|*.example.com"
//!
//! [[profiles]]
//! id = "corporate"
//!
//! [profiles.properties]
//! "build.channel" = "stable"
//!
//! [[profiles.repositories]]
//! id = "releases"
//! url = "https://nexus.example.com/repository/releases/"
//! ```

mod profile;
mod server;

pub use profile::{
    Activation, ActivationFile, ActivationOs, ActivationProperty, PolicySettings, Profile,
    RepositorySettings,
};
pub use server::{Mirror, ProxySettings, Server};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One settings document, or the merge of several
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Local repository directory
    pub local_repository: Option<String>,

    /// Whether the build should run offline; `None` when not stated
    pub offline: Option<bool>,

    /// Profile ids activated by this file
    pub active_profiles: Vec<String>,

    pub servers: Vec<Server>,

    pub mirrors: Vec<Mirror>,

    pub proxies: Vec<ProxySettings>,

    pub profiles: Vec<Profile>,
}

impl Settings {
    /// Parse settings from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use depctx_model::Settings;
    ///
    /// let settings = Settings::parse(r#"
    /// offline = true
    ///
    /// [[servers]]
    /// id = "central"
    /// username = "reader"
    /// "#).unwrap();
    ///
    /// assert_eq!(settings.offline, Some(true));
    /// assert_eq!(settings.servers[0].id, "central");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::SettingsParse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Load settings from a file.
    ///
    /// Missing files are not an error here; callers check existence first
    /// so that an absent layer is skipped rather than reported.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::SettingsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge another settings document into this one
    ///
    /// The `other` document dominates:
    /// - scalar values are taken from `other` when it sets them
    /// - `active_profiles`: union, `other` first
    /// - servers, mirrors, proxies, profiles: keyed by id, `other` wins and
    ///   entries only present in `self` are kept after those of `other`
    pub fn merge(&mut self, other: &Settings) {
        if other.local_repository.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            self.local_repository = other.local_repository.clone();
        }
        if other.offline.is_some() {
            self.offline = other.offline;
        }

        self.active_profiles = union_strings(&other.active_profiles, &self.active_profiles);
        self.servers = merge_by_id(&other.servers, &self.servers, |s| &s.id);
        self.mirrors = merge_by_id(&other.mirrors, &self.mirrors, |m| &m.id);
        self.proxies = merge_by_id(&other.proxies, &self.proxies, |p| &p.id);
        self.profiles = merge_by_id(&other.profiles, &self.profiles, |p| &p.id);
    }

    /// Whether the settings are offline (unset means online).
    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }

    pub fn server(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

fn union_strings(dominant: &[String], recessive: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(dominant.len() + recessive.len());
    for value in dominant.iter().chain(recessive) {
        if !merged.contains(value) {
            merged.push(value.clone());
        }
    }
    merged
}

fn merge_by_id<T: Clone>(dominant: &[T], recessive: &[T], id: impl Fn(&T) -> &String) -> Vec<T> {
    let mut merged: Vec<T> = dominant.to_vec();
    for item in recessive {
        if !merged.iter().any(|m| id(m) == id(item)) {
            merged.push(item.clone());
        }
    }
    merged
}
