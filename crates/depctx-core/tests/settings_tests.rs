//! Integration tests for contexts built from discovered settings files.

use depctx_core::{
    AddRepositoriesOp, BootStrategy, Context, ErrorKind, Overrides, PlainTextDecrypter, Runtime,
    SettingsResolver, StandardRuntime, TomlSettingsBuilder,
};
use depctx_engine::{FileRepositoryEngine, RepositoryEngine};
use depctx_model::RemoteRepository;
use depctx_test_utils::{TestHome, TestRepository};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

fn runtime() -> Arc<StandardRuntime> {
    Arc::new(StandardRuntime::new(
        "standalone",
        10,
        BootStrategy::static_engine(|| {
            Ok(Arc::new(FileRepositoryEngine::new()) as Arc<dyn RepositoryEngine>)
        }),
    ))
}

fn overrides(home: &TestHome) -> Overrides {
    Overrides::builder()
        .with_user_settings(true)
        .system_properties(home.system_properties())
        .build()
}

fn create(overrides: Overrides) -> Context {
    runtime().create(overrides).unwrap()
}

fn ids(context: &Context) -> Vec<&str> {
    context.repositories().iter().map(|r| r.id.as_str()).collect()
}

const SETTINGS: &str = r#"
local-repository = "${user.home}/from-settings"
active-profiles = ["corp"]

[[profiles]]
id = "corp"
[profiles.properties]
"build.flavor" = "corp"
"corp.only" = "yes"

[[profiles.repositories]]
id = "corp-releases"
url = "https://repo.corp.example/releases/"

[[profiles]]
id = "nightly"
[profiles.activation.property]
name = "nightly"

[[profiles.repositories]]
id = "corp-nightly"
url = "https://repo.corp.example/nightly/"
"#;

// ==========================================================================
// Local repository precedence
// ==========================================================================

#[test]
fn test_settings_local_repository_used_without_override() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let context = create(overrides(&home));
    assert_eq!(context.local_repository(), home.path().join("from-settings"));
}

#[test]
fn test_explicit_local_repository_beats_settings() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let explicit = TestRepository::new();

    let context = create(
        overrides(&home)
            .to_builder()
            .local_repository(Some(explicit.path().to_path_buf()))
            .build(),
    );
    assert_eq!(context.local_repository(), explicit.path());
}

#[test]
fn test_default_local_repository_under_home() {
    let home = TestHome::new();
    let context = create(overrides(&home));
    assert_eq!(context.local_repository(), home.default_local_repository());
}

#[test]
fn test_settings_ignored_when_disabled() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let context = create(
        overrides(&home).to_builder().with_user_settings(false).build(),
    );
    assert_eq!(context.local_repository(), home.default_local_repository());
    assert_eq!(ids(&context), vec!["central"]);
    assert!(context.active_profiles().is_empty());
}

// ==========================================================================
// Profiles
// ==========================================================================

#[test]
fn test_profile_repositories_are_the_discovered_side() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);

    let context = create(
        overrides(&home)
            .to_builder()
            .repositories(vec![RemoteRepository::new("mine", "https://mine.example/")])
            .add_repositories_op(AddRepositoriesOp::Prepend)
            .build(),
    );
    assert_eq!(ids(&context), vec!["mine", "corp-releases"]);
    assert_eq!(context.active_profiles(), &["corp".to_string()]);
}

#[test]
fn test_profile_activation_by_property() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let mut user = BTreeMap::new();
    user.insert("nightly".to_string(), "true".to_string());

    let context = create(overrides(&home).to_builder().user_properties(user).build());
    assert_eq!(ids(&context), vec!["corp-releases", "corp-nightly"]);
}

#[test]
fn test_inactive_profile_is_excluded() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let context = create(
        overrides(&home)
            .to_builder()
            .inactive_profile_ids(vec!["corp".into()])
            .build(),
    );
    assert!(context.active_profiles().is_empty());
    assert_eq!(ids(&context), vec!["central"]);
}

#[test]
fn test_profile_properties_never_override_explicit_ones() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let mut user = BTreeMap::new();
    user.insert("build.flavor".to_string(), "explicit".to_string());

    let context = create(overrides(&home).to_builder().user_properties(user).build());
    assert_eq!(context.session().property("build.flavor"), Some("explicit"));
    assert_eq!(context.session().property("corp.only"), Some("yes"));
}

#[test]
fn test_resolver_without_selector_ignores_conditions() {
    let home = TestHome::new();
    home.write_user_settings(SETTINGS);
    let mut user = BTreeMap::new();
    user.insert("nightly".to_string(), "true".to_string());

    let resolver =
        SettingsResolver::new(Arc::new(TomlSettingsBuilder), Arc::new(PlainTextDecrypter));
    let runtime = Arc::new(
        StandardRuntime::new(
            "no-selector",
            10,
            BootStrategy::static_engine(|| {
                Ok(Arc::new(FileRepositoryEngine::new()) as Arc<dyn RepositoryEngine>)
            }),
        )
        .with_settings_resolver(resolver),
    );
    let context = runtime
        .create(overrides(&home).to_builder().user_properties(user).build())
        .unwrap();
    assert_eq!(ids(&context), vec!["corp-releases"]);
}

// ==========================================================================
// Mirrors, proxies and credentials
// ==========================================================================

#[test]
fn test_mirror_and_credentials_applied() {
    let home = TestHome::new();
    home.write_user_settings(
        r#"
[[mirrors]]
id = "corp-mirror"
url = "https://mirror.corp.example/"
mirror-of = "*"

[[servers]]
id = "corp-mirror"
username = "reader"
password = "secret"

[[proxies]]
protocol = "https"
host = "proxy.corp.example"
port = 3128
"#,
    );
    let context = create(overrides(&home));

    assert_eq!(ids(&context), vec!["corp-mirror"]);
    let mirror = &context.repositories()[0];
    assert_eq!(mirror.mirrored[0].id, "central");
    assert_eq!(
        mirror.authentication.as_ref().and_then(|a| a.username.as_deref()),
        Some("reader")
    );
    assert_eq!(mirror.proxy.as_ref().map(|p| p.port), Some(3128));
}

#[test]
fn test_customized_repository_behind_same_mirror_is_folded_in() {
    let home = TestHome::new();
    home.write_user_settings(
        r#"
[[mirrors]]
id = "corp-mirror"
url = "https://mirror.corp.example/"
mirror-of = "*"
"#,
    );
    let parent = create(overrides(&home));
    assert_eq!(ids(&parent), vec!["corp-mirror"]);

    let child = parent
        .customize(
            Overrides::builder()
                .system_properties(BTreeMap::new())
                .repositories(vec![RemoteRepository::new("extra", "https://extra.example/")])
                .add_repositories_op(AddRepositoriesOp::Append)
                .build(),
        )
        .unwrap();

    assert_eq!(ids(&child), vec!["corp-mirror"]);
    let mirrored: Vec<&str> = child.repositories()[0]
        .mirrored
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(mirrored, vec!["central", "extra"]);
    assert_eq!(parent.repositories()[0].mirrored.len(), 1, "Parent must be unaffected");
}

#[test]
fn test_undecryptable_server_is_dropped_not_fatal() {
    let home = TestHome::new();
    home.write_user_settings(
        r#"
[[servers]]
id = "central"
username = "reader"
password = "{bm90LXJlYWxseS1lbmNyeXB0ZWQ=}"
"#,
    );
    let context = create(overrides(&home));
    assert_eq!(ids(&context), vec!["central"]);
    assert!(context.repositories()[0].authentication.is_none());
}

#[test]
fn test_malformed_settings_abort_creation() {
    let home = TestHome::new();
    home.write_user_settings("mirrors = \"not a list\"");
    let err = runtime().create(overrides(&home)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_global_settings_layered_under_user() {
    let home = TestHome::new();
    home.write_global_settings(
        r#"
local-repository = "/global/repository"
offline = true
"#,
    );
    home.write_user_settings(r#"local-repository = "${user.home}/user-repository""#);

    let context = create(overrides(&home));
    assert_eq!(
        context.local_repository(),
        PathBuf::from(home.path()).join("user-repository")
    );
    assert!(context.session().is_offline());
}
