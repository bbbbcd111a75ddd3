//! The repository engine contract

use crate::local::LocalRepositoryManager;
use crate::session::Session;
use crate::{ResolutionError, Result};
use depctx_model::{Artifact, RemoteRepository};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A request to resolve one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub artifact: Artifact,
    pub repositories: Vec<RemoteRepository>,
    /// Free-form label of the requesting context, used in logs
    pub context: String,
}

impl ArtifactRequest {
    pub fn new(artifact: Artifact, repositories: Vec<RemoteRepository>) -> Self {
        Self {
            artifact,
            repositories,
            context: String::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// A resolved artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactResult {
    pub artifact: Artifact,
    pub file: PathBuf,
    /// Id of the repository that delivered the file, `local` for the cache
    pub repository: String,
}

/// Performs the actual artifact resolution.
///
/// Implementations must be usable from several threads. After
/// [`shutdown`](RepositoryEngine::shutdown) every resolution fails with
/// [`ResolutionError::Shutdown`].
pub trait RepositoryEngine: Send + Sync {
    fn resolve(
        &self,
        session: &Session,
        request: &ArtifactRequest,
    ) -> std::result::Result<ArtifactResult, ResolutionError>;

    fn new_local_repository_manager(&self, path: &Path) -> Result<Arc<dyn LocalRepositoryManager>>;

    /// Apply the session's mirrors, proxies and credentials to `repositories`.
    fn new_resolution_repositories(
        &self,
        session: &Session,
        repositories: &[RemoteRepository],
    ) -> Vec<RemoteRepository> {
        aggregate_repositories(session, repositories)
    }

    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;
}

/// Replace repositories by their mirrors and attach proxies and credentials.
///
/// Repositories served by the same mirror collapse into one entry listing all
/// of them as mirrored. Ids stay unique: the first occurrence wins. Proxy and
/// authentication already present on a repository are kept.
pub fn aggregate_repositories(
    session: &Session,
    repositories: &[RemoteRepository],
) -> Vec<RemoteRepository> {
    let mut result: Vec<RemoteRepository> = Vec::with_capacity(repositories.len());
    for repository in repositories {
        let candidate = match session.mirror_selector().mirror(repository) {
            Some(mirror) => mirror,
            None => repository.clone(),
        };
        match result.iter_mut().find(|r| r.id == candidate.id) {
            Some(existing) if !candidate.mirrored.is_empty() => {
                for mirrored in candidate.mirrored {
                    if !existing.mirrored.iter().any(|m| m.id == mirrored.id) {
                        existing.mirrored.push(mirrored);
                    }
                }
            }
            Some(_) => {
                tracing::debug!(id = %candidate.id, "Skipping duplicate repository");
            }
            None => result.push(candidate),
        }
    }

    for repository in &mut result {
        if repository.proxy.is_none() {
            repository.proxy = session.proxy_selector().proxy(repository);
        }
        if repository.authentication.is_none() {
            repository.authentication = session.authentication_selector().authentication(repository);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::SimpleLocalRepositoryManager;
    use crate::selector::{DefaultAuthenticationSelector, DefaultMirrorSelector};
    use depctx_model::Authentication;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(Arc::new(SimpleLocalRepositoryManager::new("/tmp/r").unwrap()))
    }

    #[test]
    fn mirrors_collapse_repositories() {
        let session = session()
            .with_mirror_selector(Arc::new(DefaultMirrorSelector::new().add(
                "all",
                "https://mirror/",
                None,
                false,
                "*",
                None,
            )))
            .with_authentication_selector(Arc::new(
                DefaultAuthenticationSelector::new().add("all", Authentication::basic("u", "p")),
            ));

        let repos = vec![
            RemoteRepository::new("a", "https://a/"),
            RemoteRepository::new("b", "https://b/"),
        ];
        let aggregated = aggregate_repositories(&session, &repos);

        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].id, "all");
        let mirrored: Vec<_> = aggregated[0].mirrored.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(mirrored, vec!["a", "b"]);
        assert!(aggregated[0].authentication.is_some());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let repos = vec![
            RemoteRepository::new("a", "https://first/"),
            RemoteRepository::new("a", "https://second/"),
        ];
        let aggregated = aggregate_repositories(&session(), &repos);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].url, "https://first/");
    }
}
