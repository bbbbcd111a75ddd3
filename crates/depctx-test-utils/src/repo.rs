//! [`TestRepository`] builder for artifact repository fixtures.

use depctx_model::Artifact;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory laid out as a default-layout artifact repository.
///
/// # Example
///
/// ```rust,no_run
/// use depctx_test_utils::TestRepository;
///
/// let repo = TestRepository::new().with_artifact("org.example:lib:1.0");
/// repo.assert_artifact_exists("org.example:lib:1.0");
/// println!("{}", repo.url());
/// ```
pub struct TestRepository {
    temp_dir: TempDir,
}

impl Default for TestRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepository {
    /// Create an empty repository directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root directory of the repository.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `file://` URL pointing at the repository root.
    pub fn url(&self) -> String {
        let path = self.path().to_string_lossy().replace('\\', "/");
        if path.starts_with('/') {
            format!("file://{path}")
        } else {
            format!("file:///{path}")
        }
    }

    /// Seed an artifact given as `group:artifact[:extension[:classifier]]:version`.
    ///
    /// # Panics
    /// Panics on malformed coordinates or filesystem errors.
    pub fn with_artifact(self, coords: &str) -> Self {
        let contents = format!("contents of {coords}");
        self.with_artifact_contents(coords, contents.as_bytes())
    }

    /// Seed an artifact with explicit contents.
    pub fn with_artifact_contents(self, coords: &str, contents: &[u8]) -> Self {
        let file = self.artifact_path(coords);
        fs::create_dir_all(file.parent().unwrap())
            .unwrap_or_else(|e| panic!("with_artifact: failed to create dirs for {coords}: {e}"));
        fs::write(&file, contents)
            .unwrap_or_else(|e| panic!("with_artifact: failed to write {}: {e}", file.display()));
        self
    }

    /// Absolute path where `coords` lives in this repository.
    pub fn artifact_path(&self, coords: &str) -> PathBuf {
        let artifact = Artifact::parse(coords)
            .unwrap_or_else(|e| panic!("artifact_path: bad coordinates {coords}: {e}"));
        self.path()
            .join(artifact.layout_path().split('/').collect::<PathBuf>())
    }

    /// Assert that an artifact is present.
    pub fn assert_artifact_exists(&self, coords: &str) {
        let file = self.artifact_path(coords);
        assert!(file.is_file(), "Expected artifact {coords} at {}", file.display());
    }

    /// Assert that an artifact is absent.
    pub fn assert_artifact_missing(&self, coords: &str) {
        let file = self.artifact_path(coords);
        assert!(!file.exists(), "Expected no artifact {coords} at {}", file.display());
    }
}
