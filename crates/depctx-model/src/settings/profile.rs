//! Profiles and their activation predicates

use crate::repository::{ChecksumPolicy, RemoteRepository, RepositoryPolicy, UpdatePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_layout() -> String {
    "default".to_string()
}

/// A named, conditionally activated bundle of properties and repositories
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub activation: Option<Activation>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub repositories: Vec<RepositorySettings>,
}

impl Profile {
    pub fn is_active_by_default(&self) -> bool {
        self.activation.as_ref().is_some_and(|a| a.active_by_default)
    }

    /// Repositories declared by this profile, in declaration order.
    pub fn remote_repositories(&self) -> Vec<RemoteRepository> {
        self.repositories
            .iter()
            .map(RepositorySettings::to_remote)
            .collect()
    }
}

/// Conditions under which a profile activates.
///
/// All present conditions must hold. Values prefixed with `!` negate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Activation {
    pub active_by_default: bool,
    /// JDK version prefix (`17`), negated prefix (`!1.8`) or range (`[11,21)`)
    pub jdk: Option<String>,
    pub os: Option<ActivationOs>,
    pub property: Option<ActivationProperty>,
    pub file: Option<ActivationFile>,
}

impl Activation {
    /// Whether any condition beyond `active-by-default` is declared.
    pub fn has_conditions(&self) -> bool {
        self.jdk.is_some() || self.os.is_some() || self.property.is_some() || self.file.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActivationOs {
    pub name: Option<String>,
    pub family: Option<String>,
    pub arch: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActivationProperty {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActivationFile {
    pub exists: Option<String>,
    pub missing: Option<String>,
}

/// Release/snapshot policy as written in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub update_policy: Option<UpdatePolicy>,
    #[serde(default)]
    pub checksum_policy: Option<ChecksumPolicy>,
}

impl PolicySettings {
    fn to_policy(self) -> RepositoryPolicy {
        let defaults = RepositoryPolicy::default();
        RepositoryPolicy {
            enabled: self.enabled,
            update_policy: self.update_policy.unwrap_or(defaults.update_policy),
            checksum_policy: self.checksum_policy.unwrap_or(defaults.checksum_policy),
        }
    }
}

/// A repository declared inside a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositorySettings {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub releases: Option<PolicySettings>,
    #[serde(default)]
    pub snapshots: Option<PolicySettings>,
}

impl RepositorySettings {
    pub fn to_remote(&self) -> RemoteRepository {
        RemoteRepository::new(&self.id, &self.url)
            .with_layout(&self.layout)
            .with_releases(self.releases.map(PolicySettings::to_policy).unwrap_or_default())
            .with_snapshots(self.snapshots.map(PolicySettings::to_policy).unwrap_or_default())
    }
}
