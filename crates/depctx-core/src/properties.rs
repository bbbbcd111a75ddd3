//! Host property discovery and well-known property keys
//!
//! Properties are plain string maps. The host contributes two sources:
//! environment variables, exposed under the `env.` prefix, and system
//! properties describing the operating system and the current user.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prefix marking properties taken from environment variables
pub const ENV_PREFIX: &str = "env.";

pub const LOCAL_REPOSITORY: &str = "maven.repo.local";
pub const LOCAL_REPOSITORY_TAIL: &str = "maven.repo.local.tail";
pub const LOCAL_REPOSITORY_TAIL_IGNORE_AVAILABILITY: &str =
    "maven.repo.local.tail.ignoreAvailability";
pub const USER_HOME: &str = "user.home";
pub const MAVEN_HOME: &str = "maven.home";
pub const MAVEN_CONF: &str = "maven.conf";
pub const JAVA_VERSION: &str = "java.version";
pub const OS_NAME: &str = "os.name";
pub const OS_FAMILY: &str = "os.family";
pub const OS_ARCH: &str = "os.arch";
pub const OS_VERSION: &str = "os.version";

/// Environment variables plus system properties of the running host.
pub fn host_system_properties() -> BTreeMap<String, String> {
    let mut properties = environment_properties();
    properties.extend(system_properties());
    properties
}

/// Environment variables as `env.NAME` entries.
///
/// Names are upper-cased on Windows where the environment is
/// case-insensitive.
pub fn environment_properties() -> BTreeMap<String, String> {
    std::env::vars()
        .map(|(key, value)| {
            let key = if cfg!(windows) {
                key.to_uppercase()
            } else {
                key
            };
            (format!("{ENV_PREFIX}{key}"), value)
        })
        .collect()
}

/// Operating system and user description of the running host.
pub fn system_properties() -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        properties.insert(key.to_string(), value);
    };

    put(OS_NAME, std::env::consts::OS.to_string());
    put(OS_FAMILY, std::env::consts::FAMILY.to_string());
    put(OS_ARCH, std::env::consts::ARCH.to_string());
    put("file.separator", std::path::MAIN_SEPARATOR.to_string());
    put("path.separator", if cfg!(windows) { ";" } else { ":" }.to_string());
    put("line.separator", if cfg!(windows) { "\r\n" } else { "\n" }.to_string());

    if let Some(home) = dirs::home_dir() {
        put(USER_HOME, home.to_string_lossy().into_owned());
    }
    if let Ok(dir) = std::env::current_dir() {
        put("user.dir", dir.to_string_lossy().into_owned());
    }
    if let Some(user) = std::env::var("USER")
        .ok()
        .or_else(|| std::env::var("USERNAME").ok())
    {
        put("user.name", user);
    }
    if let Ok(home) = std::env::var("MAVEN_HOME") {
        put(MAVEN_HOME, home);
    }
    properties
}

/// Overlay `user` on `system`: user values win.
pub fn merge(
    system: &BTreeMap<String, String>,
    user: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = system.clone();
    merged.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Non-blank value of `key`.
pub fn non_blank<'a>(properties: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    properties
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Comma-separated list, blank entries dropped.
pub fn list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `true`/`false` (case-insensitive); anything else yields `default`.
pub fn flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

/// The user's home directory: `user.home`, else the platform default.
pub fn user_home(properties: &BTreeMap<String, String>) -> Option<PathBuf> {
    non_blank(properties, USER_HOME)
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// Replace `${key}` references with property values.
///
/// Unknown references are left untouched.
pub fn interpolate(text: &str, properties: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match properties.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn host_properties_describe_os_and_environment() {
        let properties = host_system_properties();
        assert_eq!(properties[OS_NAME], std::env::consts::OS);
        assert!(properties.keys().any(|k| k.starts_with(ENV_PREFIX)));
    }

    #[test]
    fn merge_prefers_user_values() {
        let merged = merge(&props(&[("a", "system"), ("b", "s")]), &props(&[("a", "user")]));
        assert_eq!(merged["a"], "user");
        assert_eq!(merged["b"], "s");
    }

    #[rstest]
    #[case(None, Vec::<&str>::new())]
    #[case(Some(""), vec![])]
    #[case(Some(" , ,"), vec![])]
    #[case(Some("/a, /b ,,/c"), vec!["/a", "/b", "/c"])]
    fn list_drops_blank_entries(#[case] value: Option<&str>, #[case] expected: Vec<&str>) {
        assert_eq!(list(value), expected);
    }

    #[rstest]
    #[case(Some("TRUE"), false, true)]
    #[case(Some("false"), true, false)]
    #[case(Some("yes"), true, true)]
    #[case(None, false, false)]
    fn flag_parsing(#[case] value: Option<&str>, #[case] default: bool, #[case] expected: bool) {
        assert_eq!(flag(value, default), expected);
    }

    #[test]
    fn interpolate_known_and_unknown_references() {
        let properties = props(&[("user.home", "/home/dev")]);
        assert_eq!(
            interpolate("${user.home}/.m2/${missing}/x", &properties),
            "/home/dev/.m2/${missing}/x"
        );
        assert_eq!(interpolate("open ${brace", &properties), "open ${brace");
    }

    #[test]
    fn non_blank_ignores_whitespace_values() {
        let properties = props(&[("k", "  ")]);
        assert_eq!(non_blank(&properties, "k"), None);
    }
}
