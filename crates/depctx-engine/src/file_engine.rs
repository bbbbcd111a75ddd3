//! Self-contained engine serving the local cache and `file://` repositories

use crate::engine::{ArtifactRequest, ArtifactResult, RepositoryEngine};
use crate::listener::{RepositoryEvent, TransferEvent};
use crate::local::{LocalRepositoryManager, SimpleLocalRepositoryManager};
use crate::session::Session;
use crate::{ResolutionError, Result};
use depctx_model::{Artifact, RemoteRepository};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const LOCAL_REPOSITORY_ID: &str = "local";

/// Resolves artifacts from the session's local repository and, when online,
/// from remote repositories reachable through the filesystem.
///
/// Downloads are written to the head of the local repository chain. Remote
/// repositories using other schemes fail with
/// [`ResolutionError::TransportUnavailable`].
#[derive(Debug, Default)]
pub struct FileRepositoryEngine {
    shut_down: AtomicBool,
}

impl FileRepositoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(session: &Session, event: RepositoryEvent) {
        if let Some(listener) = session.repository_listener() {
            listener.on_repository_event(&event);
        }
    }

    fn emit_transfer(session: &Session, event: TransferEvent) {
        if let Some(listener) = session.transfer_listener() {
            listener.on_transfer(&event);
        }
    }

    fn download(
        &self,
        session: &Session,
        artifact: &Artifact,
        repository: &RemoteRepository,
    ) -> std::result::Result<Option<PathBuf>, ResolutionError> {
        if repository.blocked {
            return Err(ResolutionError::Blocked {
                repository: repository.id.clone(),
            });
        }
        let Some(root) = file_url_path(&repository.url) else {
            return Err(ResolutionError::TransportUnavailable {
                repository: repository.id.clone(),
                url: repository.url.clone(),
            });
        };

        let resource = artifact.layout_path();
        let source: PathBuf = root.join(resource.split('/').collect::<PathBuf>());
        Self::emit_transfer(
            session,
            TransferEvent::Initiated {
                repository: repository.id.clone(),
                resource: resource.clone(),
            },
        );
        if !source.is_file() {
            Self::emit_transfer(
                session,
                TransferEvent::Failed {
                    repository: repository.id.clone(),
                    resource,
                    message: "not found".to_string(),
                },
            );
            return Ok(None);
        }

        let stored = session.local_repository_manager().add(artifact, &source)?;
        let bytes = std::fs::metadata(&stored).map(|m| m.len()).unwrap_or(0);
        Self::emit_transfer(
            session,
            TransferEvent::Succeeded {
                repository: repository.id.clone(),
                resource,
                bytes,
            },
        );
        Ok(Some(stored))
    }
}

impl RepositoryEngine for FileRepositoryEngine {
    fn resolve(
        &self,
        session: &Session,
        request: &ArtifactRequest,
    ) -> std::result::Result<ArtifactResult, ResolutionError> {
        if self.is_shutdown() {
            return Err(ResolutionError::Shutdown);
        }
        let artifact = &request.artifact;
        Self::emit(
            session,
            RepositoryEvent::ArtifactResolving {
                artifact: artifact.clone(),
            },
        );

        let local = session.local_repository_manager().find(artifact);
        if let Some(file) = local.file {
            tracing::debug!(artifact = %artifact, file = %file.display(), "Resolved from local repository");
            Self::emit(
                session,
                RepositoryEvent::ArtifactResolved {
                    artifact: artifact.clone(),
                    repository: LOCAL_REPOSITORY_ID.to_string(),
                    file: Some(file.clone()),
                },
            );
            return Ok(ArtifactResult {
                artifact: artifact.clone(),
                file,
                repository: LOCAL_REPOSITORY_ID.to_string(),
            });
        }

        let candidates: Vec<&RemoteRepository> = request
            .repositories
            .iter()
            .filter(|r| r.policy(artifact.is_snapshot()).enabled)
            .collect();

        if session.is_offline() {
            if let Some(first) = candidates.first() {
                return Err(ResolutionError::Offline {
                    artifact: artifact.to_string(),
                    repository: first.id.clone(),
                });
            }
        }

        let mut failure = None;
        for repository in &candidates {
            match self.download(session, artifact, repository) {
                Ok(Some(file)) => {
                    Self::emit(
                        session,
                        RepositoryEvent::ArtifactResolved {
                            artifact: artifact.clone(),
                            repository: repository.id.clone(),
                            file: Some(file.clone()),
                        },
                    );
                    return Ok(ArtifactResult {
                        artifact: artifact.clone(),
                        file,
                        repository: repository.id.clone(),
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(repository = %repository.id, error = %e, "Repository failed");
                    failure.get_or_insert(e);
                }
            }
        }

        Self::emit(
            session,
            RepositoryEvent::ArtifactResolved {
                artifact: artifact.clone(),
                repository: String::new(),
                file: None,
            },
        );
        Err(failure.unwrap_or_else(|| ResolutionError::NotFound {
            artifact: artifact.to_string(),
            repositories: std::iter::once(LOCAL_REPOSITORY_ID.to_string())
                .chain(candidates.iter().map(|r| r.id.clone()))
                .collect(),
        }))
    }

    fn new_local_repository_manager(&self, path: &Path) -> Result<Arc<dyn LocalRepositoryManager>> {
        Ok(Arc::new(SimpleLocalRepositoryManager::new(path)?))
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("File repository engine shut down");
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

/// Filesystem path of a `file:` URL.
fn file_url_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://").or_else(|| url.strip_prefix("file:"))?;
    // file:///C:/repo
    let rest = match rest.as_bytes() {
        [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() => &rest[1..],
        _ => rest,
    };
    Some(PathBuf::from(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("file:///tmp/repo", Some("/tmp/repo"))]
    #[case("file:/tmp/repo", Some("/tmp/repo"))]
    #[case("file:///C:/repo", Some("C:/repo"))]
    #[case("https://repo.example/", None)]
    fn file_urls(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(file_url_path(url), expected.map(PathBuf::from));
    }

    #[test]
    fn shutdown_is_sticky() {
        let engine = FileRepositoryEngine::new();
        assert!(!engine.is_shutdown());
        engine.shutdown();
        engine.shutdown();
        assert!(engine.is_shutdown());
    }
}
