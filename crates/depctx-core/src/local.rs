//! Local repository chain: a primary cache with read-only fallbacks

use crate::Result;
use crate::properties;
use depctx_engine::{LocalArtifactResult, LocalRepositoryManager, RepositoryEngine};
use depctx_model::Artifact;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Describes the local repository layout of a context.
///
/// The primary ("head") repository receives all writes. Tail repositories
/// are consulted in order when the head does not hold an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepositoryChain {
    primary: PathBuf,
    tail: Vec<PathBuf>,
    ignore_tail_availability: bool,
}

impl LocalRepositoryChain {
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            tail: Vec::new(),
            ignore_tail_availability: true,
        }
    }

    /// Chain for `primary` with the tail configured through
    /// `maven.repo.local.tail` and `maven.repo.local.tail.ignoreAvailability`.
    pub fn from_properties(
        primary: impl Into<PathBuf>,
        properties: &BTreeMap<String, String>,
    ) -> Self {
        let tail = properties::list(
            properties
                .get(properties::LOCAL_REPOSITORY_TAIL)
                .map(String::as_str),
        );
        let ignore = properties::flag(
            properties
                .get(properties::LOCAL_REPOSITORY_TAIL_IGNORE_AVAILABILITY)
                .map(String::as_str),
            true,
        );
        Self::new(primary).with_tail(tail).ignore_tail_availability(ignore)
    }

    /// Fallback locations, blank entries dropped.
    #[must_use]
    pub fn with_tail<I, S>(mut self, tail: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tail = tail
            .into_iter()
            .filter_map(|s| {
                let s = s.as_ref().trim();
                (!s.is_empty()).then(|| PathBuf::from(s))
            })
            .collect();
        self
    }

    #[must_use]
    pub fn ignore_tail_availability(mut self, ignore: bool) -> Self {
        self.ignore_tail_availability = ignore;
        self
    }

    pub fn primary(&self) -> &Path {
        &self.primary
    }

    pub fn tail(&self) -> &[PathBuf] {
        &self.tail
    }

    /// Create the manager through `engine`.
    ///
    /// Without a tail this is the engine's plain manager for the primary path.
    pub fn build(&self, engine: &dyn RepositoryEngine) -> Result<Arc<dyn LocalRepositoryManager>> {
        let head = engine.new_local_repository_manager(&self.primary)?;
        if self.tail.is_empty() {
            return Ok(head);
        }

        let tail = self
            .tail
            .iter()
            .map(|path| engine.new_local_repository_manager(path))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(
            primary = %self.primary.display(),
            tail = tail.len(),
            "Chained local repository"
        );
        Ok(Arc::new(ChainedLocalRepositoryManager {
            head,
            tail,
            ignore_tail_availability: self.ignore_tail_availability,
        }))
    }
}

/// Reads from the head, then from each tail manager; writes to the head only
#[derive(Debug)]
pub struct ChainedLocalRepositoryManager {
    head: Arc<dyn LocalRepositoryManager>,
    tail: Vec<Arc<dyn LocalRepositoryManager>>,
    ignore_tail_availability: bool,
}

impl ChainedLocalRepositoryManager {
    pub fn head(&self) -> &Arc<dyn LocalRepositoryManager> {
        &self.head
    }

    pub fn tail(&self) -> &[Arc<dyn LocalRepositoryManager>] {
        &self.tail
    }
}

impl LocalRepositoryManager for ChainedLocalRepositoryManager {
    fn base_dir(&self) -> &Path {
        self.head.base_dir()
    }

    fn is_available(&self) -> bool {
        self.head.is_available()
    }

    fn path_for_artifact(&self, artifact: &Artifact) -> PathBuf {
        self.head.path_for_artifact(artifact)
    }

    fn find(&self, artifact: &Artifact) -> LocalArtifactResult {
        let result = self.head.find(artifact);
        if result.is_available() {
            return result;
        }
        for manager in &self.tail {
            if !self.ignore_tail_availability && !manager.is_available() {
                tracing::warn!(
                    path = %manager.base_dir().display(),
                    "Skipping unavailable tail local repository"
                );
                continue;
            }
            let result = manager.find(artifact);
            if result.is_available() {
                return result;
            }
        }
        LocalArtifactResult::missing()
    }

    fn add(&self, artifact: &Artifact, source: &Path) -> depctx_engine::Result<PathBuf> {
        self.head.add(artifact, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depctx_engine::{FileRepositoryEngine, SimpleLocalRepositoryManager};
    use depctx_test_utils::TestRepository;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn artifact() -> Artifact {
        Artifact::new("org.example", "lib", "1.0")
    }

    #[test]
    fn blank_tail_behaves_like_no_tail() {
        let chain = LocalRepositoryChain::new("/tmp/primary").with_tail(["", "  "]);
        assert!(chain.tail().is_empty());
        assert_eq!(chain, LocalRepositoryChain::new("/tmp/primary"));
    }

    #[test]
    fn tail_from_properties() {
        let mut props = BTreeMap::new();
        props.insert(
            properties::LOCAL_REPOSITORY_TAIL.to_string(),
            "/a, ,/b".to_string(),
        );
        props.insert(
            properties::LOCAL_REPOSITORY_TAIL_IGNORE_AVAILABILITY.to_string(),
            "false".to_string(),
        );
        let chain = LocalRepositoryChain::from_properties("/primary", &props);
        assert_eq!(chain.tail(), &[PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(
            chain,
            LocalRepositoryChain::new("/primary")
                .with_tail(["/a", "/b"])
                .ignore_tail_availability(false)
        );
    }

    #[test]
    fn head_first_then_tail() {
        let head = TestRepository::new();
        let first = TestRepository::new().with_artifact_contents("org.example:lib:1.0", b"first");
        let second = TestRepository::new().with_artifact_contents("org.example:lib:1.0", b"second");

        let manager = LocalRepositoryChain::new(head.path())
            .with_tail([first.path().to_string_lossy(), second.path().to_string_lossy()])
            .build(&FileRepositoryEngine::new())
            .unwrap();

        let found = manager.find(&artifact());
        assert_eq!(found.repository.as_deref(), Some(first.path()));
        assert_eq!(manager.base_dir(), head.path());
    }

    #[test]
    fn writes_go_to_head() {
        let head = TestRepository::new();
        let tail = TestRepository::new();
        let source = tempfile::NamedTempFile::new().unwrap();

        let manager = LocalRepositoryChain::new(head.path())
            .with_tail([tail.path().to_string_lossy()])
            .build(&FileRepositoryEngine::new())
            .unwrap();
        manager.add(&artifact(), source.path()).unwrap();

        head.assert_artifact_exists("org.example:lib:1.0");
        tail.assert_artifact_missing("org.example:lib:1.0");
    }

    /// Holds artifacts but reports itself unavailable, like an unmounted share.
    #[derive(Debug)]
    struct OfflineShare(SimpleLocalRepositoryManager);

    impl LocalRepositoryManager for OfflineShare {
        fn base_dir(&self) -> &Path {
            self.0.base_dir()
        }

        fn is_available(&self) -> bool {
            false
        }

        fn path_for_artifact(&self, artifact: &Artifact) -> PathBuf {
            self.0.path_for_artifact(artifact)
        }

        fn find(&self, artifact: &Artifact) -> LocalArtifactResult {
            self.0.find(artifact)
        }

        fn add(&self, artifact: &Artifact, source: &Path) -> depctx_engine::Result<PathBuf> {
            self.0.add(artifact, source)
        }
    }

    #[rstest]
    #[case::ignored(true, true)]
    #[case::checked(false, false)]
    fn unavailable_tail_honours_availability_flag(#[case] ignore: bool, #[case] found: bool) {
        let head = TestRepository::new();
        let share = TestRepository::new().with_artifact("org.example:lib:1.0");

        let manager = ChainedLocalRepositoryManager {
            head: Arc::new(SimpleLocalRepositoryManager::new(head.path()).unwrap()),
            tail: vec![Arc::new(OfflineShare(
                SimpleLocalRepositoryManager::new(share.path()).unwrap(),
            ))],
            ignore_tail_availability: ignore,
        };

        let result = manager.find(&artifact());
        assert_eq!(result.is_available(), found);
        if found {
            assert_eq!(result.repository.as_deref(), Some(share.path()));
        }
    }

    #[test]
    fn empty_primary_is_a_configuration_error() {
        let err = LocalRepositoryChain::new("")
            .build(&FileRepositoryEngine::new())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
