//! Conventional settings file and local repository locations

use crate::overrides::Overrides;
use crate::properties;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.toml";
pub const SETTINGS_SECURITY_FILE: &str = "settings-security.toml";
pub const USER_DIR: &str = ".m2";
pub const LOCAL_REPOSITORY_DIR: &str = "repository";

/// `${user.home}/.m2`
pub fn user_dir(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    properties::user_home(properties).map(|home| home.join(USER_DIR))
}

/// `${user.home}/.m2/settings.toml`
pub fn default_user_settings(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    user_dir(properties).map(|dir| dir.join(SETTINGS_FILE))
}

/// `${maven.conf}/settings.toml`, else `${maven.home}/conf/settings.toml`.
///
/// `maven.home` falls back to the `MAVEN_HOME` environment variable.
pub fn default_global_settings(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    if let Some(conf) = properties::non_blank(properties, properties::MAVEN_CONF) {
        return Some(PathBuf::from(conf).join(SETTINGS_FILE));
    }
    let env_home = format!("{}MAVEN_HOME", properties::ENV_PREFIX);
    properties::non_blank(properties, properties::MAVEN_HOME)
        .or_else(|| properties::non_blank(properties, &env_home))
        .map(|home| PathBuf::from(home).join("conf").join(SETTINGS_FILE))
}

/// `${user.home}/.m2/settings-security.toml`
pub fn default_settings_security(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    user_dir(properties).map(|dir| dir.join(SETTINGS_SECURITY_FILE))
}

/// `${user.home}/.m2/repository`
pub fn default_local_repository(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    user_dir(properties).map(|dir| dir.join(LOCAL_REPOSITORY_DIR))
}

/// Settings file paths for one resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLocations {
    pub global: Option<PathBuf>,
    pub user: Option<PathBuf>,
    pub security: Option<PathBuf>,
}

impl SettingsLocations {
    /// Explicit paths from `overrides`, conventional locations otherwise.
    pub fn resolve(overrides: &Overrides) -> Self {
        let properties = overrides.effective_properties();
        Self {
            global: overrides
                .global_settings()
                .map(PathBuf::from)
                .or_else(|| default_global_settings(&properties)),
            user: overrides
                .user_settings()
                .map(PathBuf::from)
                .or_else(|| default_user_settings(&properties)),
            security: overrides
                .settings_security()
                .map(PathBuf::from)
                .or_else(|| default_settings_security(&properties)),
        }
    }
}
