//! Mirror, proxy and credential tables extracted from settings

use super::decrypt::SettingsDecrypter;
use crate::Result;
use depctx_engine::{DefaultAuthenticationSelector, DefaultMirrorSelector, DefaultProxySelector};
use depctx_model::{ProxySettings, Server, Settings};
use std::path::Path;

/// Selector tables for a session, built from merged settings.
///
/// Secrets are decrypted while extracting. An entry whose secret cannot be
/// decrypted is left out and its id recorded in `dropped`.
#[derive(Debug, Clone, Default)]
pub struct SettingsSelectors {
    pub mirrors: DefaultMirrorSelector,
    pub proxies: DefaultProxySelector,
    pub authentication: DefaultAuthenticationSelector,
    pub dropped: Vec<String>,
}

impl SettingsSelectors {
    pub fn extract(
        settings: &Settings,
        decrypter: &dyn SettingsDecrypter,
        security: Option<&Path>,
    ) -> Self {
        let mut selectors = Self::default();

        for mirror in &settings.mirrors {
            selectors.mirrors = selectors.mirrors.add(
                &mirror.id,
                &mirror.url,
                mirror.layout.as_deref(),
                mirror.blocked,
                &mirror.mirror_of,
                mirror.mirror_of_layouts.as_deref(),
            );
        }

        for proxy in settings.proxies.iter().filter(|p| p.active) {
            match decrypt_proxy(proxy, decrypter, security) {
                Ok(proxy) => {
                    selectors.proxies = selectors
                        .proxies
                        .add(proxy.to_proxy(), proxy.non_proxy_hosts.as_deref());
                }
                Err(e) => {
                    tracing::warn!(proxy = %proxy.id, error = %e, "Dropping proxy with undecryptable credentials");
                    selectors.dropped.push(proxy.id.clone());
                }
            }
        }

        for server in &settings.servers {
            match decrypt_server(server, decrypter, security) {
                Ok(server) => {
                    if let Some(authentication) = server.authentication() {
                        selectors.authentication =
                            selectors.authentication.add(&server.id, authentication);
                    }
                }
                Err(e) => {
                    tracing::warn!(server = %server.id, error = %e, "Dropping server with undecryptable credentials");
                    selectors.dropped.push(server.id.clone());
                }
            }
        }

        tracing::debug!(
            mirrors = selectors.mirrors.len(),
            proxies = selectors.proxies.len(),
            servers = selectors.authentication.len(),
            dropped = selectors.dropped.len(),
            "Extracted selectors from settings"
        );
        selectors
    }
}

fn decrypt_field(
    id: &str,
    value: &Option<String>,
    decrypter: &dyn SettingsDecrypter,
    security: Option<&Path>,
) -> Result<Option<String>> {
    value
        .as_deref()
        .map(|v| decrypter.decrypt(id, v, security))
        .transpose()
}

fn decrypt_proxy(
    proxy: &ProxySettings,
    decrypter: &dyn SettingsDecrypter,
    security: Option<&Path>,
) -> Result<ProxySettings> {
    if !proxy.has_credentials() {
        return Ok(proxy.clone());
    }
    Ok(ProxySettings {
        username: decrypt_field(&proxy.id, &proxy.username, decrypter, security)?,
        password: decrypt_field(&proxy.id, &proxy.password, decrypter, security)?,
        ..proxy.clone()
    })
}

fn decrypt_server(
    server: &Server,
    decrypter: &dyn SettingsDecrypter,
    security: Option<&Path>,
) -> Result<Server> {
    Ok(Server {
        password: decrypt_field(&server.id, &server.password, decrypter, security)?,
        passphrase: decrypt_field(&server.id, &server.passphrase, decrypter, security)?,
        ..server.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::decrypt::PlainTextDecrypter;
    use depctx_engine::{AuthenticationSelector, MirrorSelector, ProxySelector};
    use depctx_model::RemoteRepository;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings::parse(
            r#"
[[servers]]
id = "internal"
username = "deploy"
password = "plain"

[[servers]]
id = "vault"
username = "deploy"
password = "{encrypted=}"

[[mirrors]]
id = "corp"
url = "https://mirror.corp/"
mirror-of = "external:*"

[[proxies]]
id = "office"
protocol = "https"
host = "proxy.corp"
port = 3128
non-proxy-hosts = "*.corp"

[[proxies]]
id = "locked"
host = "locked.corp"
password = "{encrypted=}"

[[proxies]]
id = "off"
active = false
host = "off.corp"
"#,
        )
        .unwrap()
    }

    #[test]
    fn undecryptable_entries_are_dropped() {
        let selectors = SettingsSelectors::extract(&settings(), &PlainTextDecrypter, None);
        assert_eq!(selectors.dropped, vec!["locked", "vault"]);
        assert!(selectors.authentication.contains("internal"));
        assert!(!selectors.authentication.contains("vault"));
        assert_eq!(selectors.proxies.len(), 1);
    }

    #[test]
    fn tables_answer_per_repository() {
        let selectors = SettingsSelectors::extract(&settings(), &PlainTextDecrypter, None);

        let central = RemoteRepository::central();
        let mirror = selectors.mirrors.mirror(&central).unwrap();
        assert_eq!(mirror.id, "corp");

        let proxy = selectors.proxies.proxy(&central).unwrap();
        assert_eq!(proxy.host, "proxy.corp");
        assert!(selectors.proxies.proxy(&mirror).is_none());

        let internal = RemoteRepository::new("internal", "https://repo.corp/");
        let auth = selectors.authentication.authentication(&internal).unwrap();
        assert_eq!(auth.username.as_deref(), Some("deploy"));
        assert_eq!(auth.password.as_deref(), Some("plain"));
    }
}
