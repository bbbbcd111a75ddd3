//! Servers, mirrors and proxies declared in settings

use crate::repository::{Authentication, Proxy};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_proxy_id() -> String {
    "default".to_string()
}

fn default_proxy_port() -> u16 {
    8080
}

/// Credentials for the repository (or mirror) with the same id
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub passphrase: Option<String>,
}

impl Server {
    pub fn authentication(&self) -> Option<Authentication> {
        let auth = Authentication {
            username: self.username.clone(),
            password: self.password.clone(),
            private_key: self.private_key.clone(),
            passphrase: self.passphrase.clone(),
        };
        (!auth.is_empty()).then_some(auth)
    }
}

/// A repository that stands in for others
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mirror {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    /// Pattern of repository ids this mirror serves (`*`, `external:*`, `a,!b`)
    pub mirror_of: String,
    #[serde(default)]
    pub layout: Option<String>,
    /// Pattern of repository layouts this mirror serves
    #[serde(default)]
    pub mirror_of_layouts: Option<String>,
    #[serde(default)]
    pub blocked: bool,
}

/// A proxy entry as written in settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxySettings {
    #[serde(default = "default_proxy_id")]
    pub id: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// `|`-separated host patterns that bypass the proxy
    #[serde(default)]
    pub non_proxy_hosts: Option<String>,
}

impl ProxySettings {
    pub fn to_proxy(&self) -> Proxy {
        let authentication = Authentication {
            username: self.username.clone(),
            password: self.password.clone(),
            ..Authentication::default()
        };
        Proxy {
            protocol: self.protocol.to_ascii_lowercase(),
            host: self.host.clone(),
            port: self.port,
            authentication: (!authentication.is_empty()).then_some(authentication),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}
