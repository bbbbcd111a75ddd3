//! Settings resolution
//!
//! Discovered settings are layered in a fixed order:
//! 1. Global settings (`${maven.conf}/settings.toml` or
//!    `${maven.home}/conf/settings.toml`)
//! 2. User settings (`${user.home}/.m2/settings.toml`)
//!
//! User settings dominate global ones. Missing files are skipped, invalid
//! ones abort the resolution. From the merged settings the active profiles
//! are selected and the mirror, proxy and credential tables extracted.
//!
//! Nothing is read unless the overrides enable discovered settings.

pub mod decrypt;
pub mod locations;
pub mod profiles;
pub mod selectors;

pub use decrypt::{PlainTextDecrypter, SettingsDecrypter};
pub use locations::SettingsLocations;
pub use profiles::{ActivationContext, DefaultProfileSelector, ProfileSelector};
pub use selectors::SettingsSelectors;

use crate::overrides::Overrides;
use crate::{Result, properties};
use depctx_model::{Profile, RemoteRepository, Settings};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Input of a [`SettingsBuilder`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsRequest {
    pub global: Option<PathBuf>,
    pub user: Option<PathBuf>,
    /// Properties available to `${...}` references in settings files
    pub properties: BTreeMap<String, String>,
}

/// Reads and merges settings files
pub trait SettingsBuilder: Send + Sync {
    fn build(&self, request: &SettingsRequest) -> Result<Settings>;
}

/// Builds settings from TOML files, user over global
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSettingsBuilder;

impl TomlSettingsBuilder {
    fn load(path: &Path, properties: &BTreeMap<String, String>) -> Result<Option<Settings>> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "Settings file not found, skipping");
            return Ok(None);
        }
        let parse_error = |message: String| depctx_model::Error::SettingsParse {
            path: path.to_path_buf(),
            message,
        };
        let content =
            fs::read_to_string(path).map_err(|e| depctx_model::Error::io(path, e))?;
        let mut document: toml::Value =
            toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        interpolate_strings(&mut document, properties);
        let settings: Settings = document
            .try_into()
            .map_err(|e: toml::de::Error| parse_error(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(Some(settings))
    }
}

/// Replace `${key}` references in every string value of `value`.
///
/// Keys and document structure are left alone, so property values are never
/// reinterpreted as TOML.
fn interpolate_strings(value: &mut toml::Value, properties: &BTreeMap<String, String>) {
    match value {
        toml::Value::String(text) => *text = properties::interpolate(text, properties),
        toml::Value::Array(items) => {
            for item in items {
                interpolate_strings(item, properties);
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                interpolate_strings(item, properties);
            }
        }
        _ => {}
    }
}

impl SettingsBuilder for TomlSettingsBuilder {
    fn build(&self, request: &SettingsRequest) -> Result<Settings> {
        let mut settings = Settings::default();
        for path in [&request.global, &request.user].into_iter().flatten() {
            if let Some(layer) = Self::load(path, &request.properties)? {
                settings.merge(&layer);
            }
        }
        Ok(settings)
    }
}

/// Outcome of a settings resolution
#[derive(Debug, Clone, Default)]
pub struct ResolvedSettings {
    pub settings: Settings,
    pub locations: SettingsLocations,
    pub active_profiles: Vec<Profile>,
    pub selectors: SettingsSelectors,
}

impl ResolvedSettings {
    pub fn active_profile_ids(&self) -> Vec<String> {
        self.active_profiles.iter().map(|p| p.id.clone()).collect()
    }

    /// Properties of all active profiles; an earlier profile's value wins.
    pub fn profile_properties(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for profile in &self.active_profiles {
            for (key, value) in &profile.properties {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        merged
    }

    /// Repositories of all active profiles, first occurrence of an id kept.
    pub fn profile_repositories(&self) -> Vec<RemoteRepository> {
        let mut repositories: Vec<RemoteRepository> = Vec::new();
        for repository in self.active_profiles.iter().flat_map(Profile::remote_repositories) {
            if !repositories.iter().any(|r| r.id == repository.id) {
                repositories.push(repository);
            }
        }
        repositories
    }

    /// Local repository declared in settings, if any
    pub fn local_repository(&self) -> Option<PathBuf> {
        self.settings
            .local_repository
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    pub fn is_offline(&self) -> bool {
        self.settings.is_offline()
    }
}

/// Reads discovered settings and selects profiles
#[derive(Clone)]
pub struct SettingsResolver {
    builder: Arc<dyn SettingsBuilder>,
    decrypter: Arc<dyn SettingsDecrypter>,
    profile_selector: Option<Arc<dyn ProfileSelector>>,
}

impl Default for SettingsResolver {
    /// TOML files, plain-text secrets, condition-based activation
    fn default() -> Self {
        Self::new(Arc::new(TomlSettingsBuilder), Arc::new(PlainTextDecrypter))
            .with_profile_selector(Arc::new(DefaultProfileSelector))
    }
}

impl SettingsResolver {
    /// Resolver without a profile selector: only requested, settings-listed
    /// and default profiles are activated.
    pub fn new(builder: Arc<dyn SettingsBuilder>, decrypter: Arc<dyn SettingsDecrypter>) -> Self {
        Self {
            builder,
            decrypter,
            profile_selector: None,
        }
    }

    #[must_use]
    pub fn with_profile_selector(mut self, selector: Arc<dyn ProfileSelector>) -> Self {
        self.profile_selector = Some(selector);
        self
    }

    pub fn resolve(&self, overrides: &Overrides) -> Result<ResolvedSettings> {
        if !overrides.with_user_settings() {
            tracing::debug!("Discovered settings disabled");
            return Ok(ResolvedSettings::default());
        }

        let locations = SettingsLocations::resolve(overrides);
        let request = SettingsRequest {
            global: locations.global.clone(),
            user: locations.user.clone(),
            properties: overrides.effective_properties(),
        };
        let settings = self.builder.build(&request)?;

        let context = ActivationContext::new(request.properties);
        let active_profiles = profiles::active_profiles(
            &settings,
            overrides,
            self.profile_selector.as_deref(),
            &context,
        );
        let selectors = SettingsSelectors::extract(
            &settings,
            self.decrypter.as_ref(),
            locations.security.as_deref(),
        );

        tracing::debug!(
            profiles = ?active_profiles.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            "Resolved settings"
        );
        Ok(ResolvedSettings {
            settings,
            locations,
            active_profiles,
            selectors,
        })
    }
}

impl std::fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsResolver")
            .field("profile_selector", &self.profile_selector.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depctx_test_utils::TestHome;
    use pretty_assertions::assert_eq;

    fn overrides(home: &TestHome) -> Overrides {
        Overrides::builder()
            .with_user_settings(true)
            .system_properties(home.system_properties())
            .build()
    }

    #[test]
    fn disabled_settings_contribute_nothing() {
        let home = TestHome::new();
        home.write_user_settings("offline = true");
        let overrides = overrides(&home).to_builder().with_user_settings(false).build();

        let resolved = SettingsResolver::default().resolve(&overrides).unwrap();
        assert!(!resolved.is_offline());
        assert!(resolved.active_profiles.is_empty());
    }

    #[test]
    fn user_settings_dominate_global() {
        let home = TestHome::new();
        home.write_global_settings(
            r#"
local-repository = "/global/repo"
offline = true
"#,
        );
        home.write_user_settings(r#"local-repository = "${user.home}/cache""#);

        let resolved = SettingsResolver::default().resolve(&overrides(&home)).unwrap();
        assert_eq!(resolved.local_repository(), Some(home.path().join("cache")));
        assert!(resolved.is_offline());
    }

    #[test]
    fn missing_files_yield_defaults() {
        let home = TestHome::new();
        let resolved = SettingsResolver::default().resolve(&overrides(&home)).unwrap();
        assert_eq!(resolved.settings, Settings::default());
        assert_eq!(resolved.locations.user, Some(home.user_settings_path()));
    }

    #[test]
    fn malformed_file_aborts() {
        let home = TestHome::new();
        home.write_user_settings("profiles = 3");
        let err = SettingsResolver::default()
            .resolve(&overrides(&home))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(err.to_string().contains("settings.toml"));
    }

    #[test]
    fn property_values_are_not_parsed_as_toml() {
        let home = TestHome::new();
        home.write_user_settings(
            r#"
local-repository = "${user.home}/cache"

[[profiles]]
id = "p"
[profiles.properties]
quoted = "${odd}"
"#,
        );
        let mut properties = BTreeMap::new();
        properties.insert(properties::USER_HOME.to_string(), r"C:\Users\dev".to_string());
        properties.insert("odd".to_string(), "/x\"\noffline = true\n#".to_string());

        let settings = TomlSettingsBuilder
            .build(&SettingsRequest {
                global: None,
                user: Some(home.user_settings_path()),
                properties,
            })
            .unwrap();
        assert_eq!(settings.local_repository.as_deref(), Some(r"C:\Users\dev/cache"));
        assert_eq!(settings.offline, None);
        assert_eq!(
            settings.profile("p").unwrap().properties["quoted"],
            "/x\"\noffline = true\n#"
        );
    }

    #[test]
    fn profile_properties_first_writer_wins() {
        let home = TestHome::new();
        home.write_user_settings(
            r#"
active-profiles = ["first", "second"]

[[profiles]]
id = "first"
[profiles.properties]
shared = "first"

[[profiles]]
id = "second"
[profiles.properties]
shared = "second"
only-second = "yes"

[[profiles.repositories]]
id = "extra"
url = "https://extra.example/"
"#,
        );

        let resolved = SettingsResolver::default().resolve(&overrides(&home)).unwrap();
        let properties = resolved.profile_properties();
        assert_eq!(properties["shared"], "first");
        assert_eq!(properties["only-second"], "yes");
        assert_eq!(resolved.active_profile_ids(), vec!["first", "second"]);
        assert_eq!(resolved.profile_repositories()[0].id, "extra");
    }
}
