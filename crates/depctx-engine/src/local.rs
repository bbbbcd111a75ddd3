//! Local repository (on-disk artifact cache) access

use crate::{Error, Result};
use depctx_model::Artifact;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of looking an artifact up in a local repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifactResult {
    /// Absolute path of the cached file when present
    pub file: Option<PathBuf>,
    /// Base directory of the repository that holds the file
    pub repository: Option<PathBuf>,
}

impl LocalArtifactResult {
    pub fn missing() -> Self {
        Self {
            file: None,
            repository: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.file.is_some()
    }
}

/// Reads from and writes to an on-disk artifact cache
pub trait LocalRepositoryManager: Send + Sync + fmt::Debug {
    /// Base directory of the primary storage
    fn base_dir(&self) -> &Path;

    /// Whether the backing storage can be reached right now
    fn is_available(&self) -> bool {
        self.base_dir().is_dir()
    }

    /// Path of an artifact relative to the base directory
    fn path_for_artifact(&self, artifact: &Artifact) -> PathBuf;

    fn find(&self, artifact: &Artifact) -> LocalArtifactResult;

    /// Copy `source` into the cache, returning the stored path
    fn add(&self, artifact: &Artifact, source: &Path) -> Result<PathBuf>;
}

/// Default-layout cache rooted at a single directory
#[derive(Debug, Clone)]
pub struct SimpleLocalRepositoryManager {
    base_dir: PathBuf,
}

impl SimpleLocalRepositoryManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        if base_dir.as_os_str().is_empty() {
            return Err(Error::LocalRepository {
                path: base_dir,
                message: "path is empty".to_string(),
            });
        }
        Ok(Self { base_dir })
    }
}

impl LocalRepositoryManager for SimpleLocalRepositoryManager {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for_artifact(&self, artifact: &Artifact) -> PathBuf {
        artifact.layout_path().split('/').collect()
    }

    fn find(&self, artifact: &Artifact) -> LocalArtifactResult {
        let file = self.base_dir.join(self.path_for_artifact(artifact));
        if file.is_file() {
            LocalArtifactResult {
                file: Some(file),
                repository: Some(self.base_dir.clone()),
            }
        } else {
            LocalArtifactResult::missing()
        }
    }

    fn add(&self, artifact: &Artifact, source: &Path) -> Result<PathBuf> {
        let target = self.base_dir.join(self.path_for_artifact(artifact));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(source, &target).map_err(|e| Error::io(&target, e))?;
        tracing::debug!(artifact = %artifact, target = %target.display(), "Stored artifact");
        Ok(target)
    }
}
