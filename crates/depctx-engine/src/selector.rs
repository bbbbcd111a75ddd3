//! Selectors consulted when a repository is contacted
//!
//! Mirrors, proxies and credentials from settings are not applied eagerly.
//! They are stored in selector tables on the [`Session`](crate::Session) and
//! looked up per repository when the engine builds its repository list.

use depctx_model::{Authentication, Proxy, RemoteRepository};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

const WILDCARD: &str = "*";
const EXTERNAL_WILDCARD: &str = "external:*";
const EXTERNAL_HTTP_WILDCARD: &str = "external:http:*";

pub trait MirrorSelector: Send + Sync {
    /// Mirror standing in for `repository`, if any
    fn mirror(&self, repository: &RemoteRepository) -> Option<RemoteRepository>;
}

pub trait ProxySelector: Send + Sync {
    fn proxy(&self, repository: &RemoteRepository) -> Option<Proxy>;
}

pub trait AuthenticationSelector: Send + Sync {
    fn authentication(&self, repository: &RemoteRepository) -> Option<Authentication>;
}

#[derive(Debug, Clone)]
struct MirrorDef {
    id: String,
    url: String,
    layout: String,
    blocked: bool,
    mirror_of: String,
    mirror_of_layouts: String,
}

/// Selects the first declared mirror whose patterns match.
///
/// `mirror_of` accepts `*`, `external:*`, `external:http:*`, exact ids and
/// `!id` exclusions, separated by commas.
#[derive(Debug, Clone, Default)]
pub struct DefaultMirrorSelector {
    mirrors: Vec<MirrorDef>,
}

impl DefaultMirrorSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add(
        mut self,
        id: &str,
        url: &str,
        layout: Option<&str>,
        blocked: bool,
        mirror_of: &str,
        mirror_of_layouts: Option<&str>,
    ) -> Self {
        self.mirrors.push(MirrorDef {
            id: id.to_string(),
            url: url.to_string(),
            layout: layout.unwrap_or("default").to_string(),
            blocked,
            mirror_of: mirror_of.to_string(),
            mirror_of_layouts: mirror_of_layouts.unwrap_or_default().to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}

impl MirrorSelector for DefaultMirrorSelector {
    fn mirror(&self, repository: &RemoteRepository) -> Option<RemoteRepository> {
        let def = self.mirrors.iter().find(|m| {
            matches_repository(repository, &m.mirror_of)
                && matches_layout(&repository.layout, &m.mirror_of_layouts)
        })?;
        Some(
            RemoteRepository::new(&def.id, &def.url)
                .with_layout(&def.layout)
                .with_releases(repository.releases)
                .with_snapshots(repository.snapshots)
                .with_blocked(def.blocked)
                .with_mirrored(vec![repository.clone()]),
        )
    }
}

fn is_external(repository: &RemoteRepository) -> bool {
    !repository.is_local()
}

fn matches_repository(repository: &RemoteRepository, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return false;
    }
    if pattern == repository.id {
        return true;
    }
    let mut result = false;
    for part in pattern.split(',').map(str::trim) {
        if let Some(excluded) = part.strip_prefix('!') {
            if excluded == repository.id {
                return false;
            }
        } else if part == repository.id {
            return true;
        } else if part == WILDCARD
            || (part == EXTERNAL_WILDCARD && is_external(repository))
            || (part == EXTERNAL_HTTP_WILDCARD
                && is_external(repository)
                && repository.protocol() == "http")
        {
            result = true;
        }
    }
    result
}

fn matches_layout(layout: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern == layout {
        return true;
    }
    let mut result = false;
    for part in pattern.split(',').map(str::trim) {
        if let Some(excluded) = part.strip_prefix('!') {
            if excluded == layout {
                return false;
            }
        } else if part == layout {
            return true;
        } else if part == WILDCARD {
            result = true;
        }
    }
    result
}

#[derive(Debug, Clone)]
struct ProxyDef {
    proxy: Proxy,
    non_proxy_hosts: Vec<Regex>,
}

/// Selects the first proxy whose protocol matches the repository URL and
/// whose non-proxy host patterns do not match its host.
#[derive(Debug, Clone, Default)]
pub struct DefaultProxySelector {
    proxies: Vec<ProxyDef>,
}

impl DefaultProxySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proxy. `non_proxy_hosts` is a `|` or `,` separated list of
    /// host names where `*` matches any sequence of characters.
    #[must_use]
    pub fn add(mut self, proxy: Proxy, non_proxy_hosts: Option<&str>) -> Self {
        let non_proxy_hosts = non_proxy_hosts
            .unwrap_or_default()
            .split(['|', ','])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(|p| {
                let pattern = format!("^{}$", regex::escape(p).replace(r"\*", ".*"));
                RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
            })
            .collect();
        self.proxies.push(ProxyDef {
            proxy,
            non_proxy_hosts,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl ProxySelector for DefaultProxySelector {
    fn proxy(&self, repository: &RemoteRepository) -> Option<Proxy> {
        let protocol = repository.protocol();
        let host = repository.host();
        self.proxies
            .iter()
            .filter(|def| def.proxy.protocol.eq_ignore_ascii_case(&protocol))
            .find(|def| !def.non_proxy_hosts.iter().any(|re| re.is_match(&host)))
            .map(|def| def.proxy.clone())
    }
}

/// Looks credentials up by repository id
#[derive(Debug, Clone, Default)]
pub struct DefaultAuthenticationSelector {
    by_id: BTreeMap<String, Authentication>,
}

impl DefaultAuthenticationSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add(mut self, id: &str, authentication: Authentication) -> Self {
        self.by_id.insert(id.to_string(), authentication);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl AuthenticationSelector for DefaultAuthenticationSelector {
    fn authentication(&self, repository: &RemoteRepository) -> Option<Authentication> {
        self.by_id.get(&repository.id).cloned()
    }
}
