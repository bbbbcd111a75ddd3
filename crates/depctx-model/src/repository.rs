//! Remote repository descriptors and their policies

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a downloaded file fails checksum verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    Fail,
    #[default]
    Warn,
    Ignore,
}

impl ChecksumPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Warn => "warn",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often cached metadata is refreshed from a repository.
///
/// Serialized as `always`, `daily`, `never` or `interval:<minutes>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpdatePolicy {
    Always,
    #[default]
    Daily,
    Never,
    Interval(u32),
}

impl FromStr for UpdatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "always" => Ok(Self::Always),
            "daily" => Ok(Self::Daily),
            "never" => Ok(Self::Never),
            other => other
                .strip_prefix("interval:")
                .and_then(|minutes| minutes.parse().ok())
                .map(Self::Interval)
                .ok_or_else(|| Error::InvalidPolicy {
                    value: s.to_string(),
                }),
        }
    }
}

impl TryFrom<String> for UpdatePolicy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<UpdatePolicy> for String {
    fn from(policy: UpdatePolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Daily => f.write_str("daily"),
            Self::Never => f.write_str("never"),
            Self::Interval(minutes) => write!(f, "interval:{minutes}"),
        }
    }
}

/// Session-wide override for snapshot update checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotUpdatePolicy {
    Always,
    Never,
}

impl From<SnapshotUpdatePolicy> for UpdatePolicy {
    fn from(policy: SnapshotUpdatePolicy) -> Self {
        match policy {
            SnapshotUpdatePolicy::Always => UpdatePolicy::Always,
            SnapshotUpdatePolicy::Never => UpdatePolicy::Never,
        }
    }
}

/// Release or snapshot policy of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepositoryPolicy {
    pub enabled: bool,
    pub update_policy: UpdatePolicy,
    pub checksum_policy: ChecksumPolicy,
}

impl RepositoryPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            update_policy: UpdatePolicy::Daily,
            checksum_policy: ChecksumPolicy::Warn,
        }
    }
}

/// Credentials attached to a repository or proxy
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Authentication {
    pub username: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub passphrase: Option<String>,
}

impl Authentication {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.private_key.is_none()
            && self.passphrase.is_none()
    }
}

// Secrets never end up in logs.
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("private_key", &self.private_key)
            .field("passphrase", &mask(&self.passphrase))
            .finish()
    }
}

/// Proxy used to reach a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub authentication: Option<Authentication>,
}

/// A remote repository as handed to the repository engine.
///
/// `id` is the identity within one repository list. `mirrored` lists the
/// repositories a mirror stands in for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRepository {
    pub id: String,
    pub layout: String,
    pub url: String,
    pub releases: RepositoryPolicy,
    pub snapshots: RepositoryPolicy,
    pub proxy: Option<Proxy>,
    pub authentication: Option<Authentication>,
    pub mirrored: Vec<RemoteRepository>,
    pub blocked: bool,
}

impl RemoteRepository {
    pub const CENTRAL_ID: &'static str = "central";
    pub const CENTRAL_URL: &'static str = "https://repo.maven.apache.org/maven2/";

    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layout: "default".to_string(),
            url: url.into(),
            releases: RepositoryPolicy::default(),
            snapshots: RepositoryPolicy::default(),
            proxy: None,
            authentication: None,
            mirrored: Vec::new(),
            blocked: false,
        }
    }

    /// The conventional central repository (releases only).
    pub fn central() -> Self {
        Self::new(Self::CENTRAL_ID, Self::CENTRAL_URL).with_snapshots(RepositoryPolicy::disabled())
    }

    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    #[must_use]
    pub fn with_releases(mut self, policy: RepositoryPolicy) -> Self {
        self.releases = policy;
        self
    }

    #[must_use]
    pub fn with_snapshots(mut self, policy: RepositoryPolicy) -> Self {
        self.snapshots = policy;
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<Proxy>) -> Self {
        self.proxy = proxy;
        self
    }

    #[must_use]
    pub fn with_authentication(mut self, authentication: Option<Authentication>) -> Self {
        self.authentication = authentication;
        self
    }

    #[must_use]
    pub fn with_mirrored(mut self, mirrored: Vec<RemoteRepository>) -> Self {
        self.mirrored = mirrored;
        self
    }

    #[must_use]
    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// URL scheme in lower case, e.g. `https` or `file`.
    pub fn protocol(&self) -> String {
        self.url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Host part of the URL, empty for `file:` URLs.
    pub fn host(&self) -> String {
        let Some((_, rest)) = self.url.split_once("://") else {
            return String::new();
        };
        let authority = rest.split('/').next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or_default();
        host_port.split(':').next().unwrap_or_default().to_string()
    }

    /// Policy applying to the given artifact kind.
    pub fn policy(&self, snapshot: bool) -> &RepositoryPolicy {
        if snapshot {
            &self.snapshots
        } else {
            &self.releases
        }
    }

    /// Whether this repository points at localhost or a `file:` URL.
    pub fn is_local(&self) -> bool {
        let host = self.host();
        self.protocol() == "file" || host == "localhost" || host == "127.0.0.1"
    }
}
