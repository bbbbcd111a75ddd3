//! [`TestHome`]: a temporary user home holding settings files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary user home with the conventional `.m2` layout, plus an
/// installation directory for global settings.
///
/// ```text
/// <home>/.m2/settings.toml
/// <home>/.m2/settings-security.toml
/// <home>/.m2/repository/
/// <home>/install/conf/settings.toml
/// ```
pub struct TestHome {
    temp_dir: TempDir,
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHome {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(".m2")).unwrap();
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn user_settings_path(&self) -> PathBuf {
        self.path().join(".m2").join("settings.toml")
    }

    pub fn security_settings_path(&self) -> PathBuf {
        self.path().join(".m2").join("settings-security.toml")
    }

    /// Installation directory, used as `maven.home`.
    pub fn install_dir(&self) -> PathBuf {
        self.path().join("install")
    }

    pub fn global_settings_path(&self) -> PathBuf {
        self.install_dir().join("conf").join("settings.toml")
    }

    /// Default local repository under this home.
    pub fn default_local_repository(&self) -> PathBuf {
        self.path().join(".m2").join("repository")
    }

    pub fn write_user_settings(&self, content: &str) -> PathBuf {
        write(&self.user_settings_path(), content)
    }

    pub fn write_global_settings(&self, content: &str) -> PathBuf {
        write(&self.global_settings_path(), content)
    }

    pub fn write_security_settings(&self, content: &str) -> PathBuf {
        write(&self.security_settings_path(), content)
    }

    /// Host-style system properties pointing `user.home` and `maven.home`
    /// at this fixture.
    pub fn system_properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        properties.insert("user.home".to_string(), display(self.path()));
        properties.insert("maven.home".to_string(), display(&self.install_dir()));
        properties.insert("os.name".to_string(), "linux".to_string());
        properties.insert("os.family".to_string(), "unix".to_string());
        properties.insert("os.arch".to_string(), "x86_64".to_string());
        properties
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("TestHome: failed to create {}: {e}", parent.display()));
    }
    fs::write(path, content)
        .unwrap_or_else(|e| panic!("TestHome: failed to write {}: {e}", path.display()));
    path.to_path_buf()
}
