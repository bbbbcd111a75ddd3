//! Integration tests for the file repository engine.

use depctx_engine::{
    ArtifactRequest, DefaultMirrorSelector, FileRepositoryEngine, RepositoryEngine,
    ResolutionError, Session, TransferEvent, TransferListener,
};
use depctx_model::{Artifact, RemoteRepository, RepositoryPolicy};
use depctx_test_utils::TestRepository;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn session(engine: &FileRepositoryEngine, local: &TestRepository) -> Session {
    Session::new(engine.new_local_repository_manager(local.path()).unwrap())
}

fn artifact(coords: &str) -> Artifact {
    Artifact::parse(coords).unwrap()
}

#[derive(Default)]
struct TransferLog(Mutex<Vec<TransferEvent>>);

impl TransferListener for TransferLog {
    fn on_transfer(&self, event: &TransferEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

// ==========================================================================
// Local cache
// ==========================================================================

#[test]
fn test_cached_artifact_resolves_without_repositories() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new().with_artifact("org.example:lib:1.0");
    let session = session(&engine, &local);

    let result = engine
        .resolve(&session, &ArtifactRequest::new(artifact("org.example:lib:1.0"), vec![]))
        .unwrap();
    assert_eq!(result.repository, "local");
    assert_eq!(result.file, local.artifact_path("org.example:lib:1.0"));
}

#[test]
fn test_missing_artifact_lists_consulted_repositories() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let remote = TestRepository::new();
    let session = session(&engine, &local);

    let err = engine
        .resolve(
            &session,
            &ArtifactRequest::new(
                artifact("org.example:absent:1.0"),
                vec![RemoteRepository::new("files", remote.url())],
            ),
        )
        .unwrap_err();
    match err {
        ResolutionError::NotFound { repositories, .. } => {
            assert_eq!(repositories, vec!["local", "files"]);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ==========================================================================
// Remote repositories
// ==========================================================================

#[test]
fn test_download_from_file_repository_emits_transfer_events() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let remote = TestRepository::new().with_artifact("org.example:lib:jar:sources:1.0");
    let log = Arc::new(TransferLog::default());
    let session = session(&engine, &local).with_transfer_listener(Some(log.clone()));

    let result = engine
        .resolve(
            &session,
            &ArtifactRequest::new(
                artifact("org.example:lib:jar:sources:1.0"),
                vec![RemoteRepository::new("files", remote.url())],
            ),
        )
        .unwrap();

    assert_eq!(result.repository, "files");
    local.assert_artifact_exists("org.example:lib:jar:sources:1.0");
    let events = log.0.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], TransferEvent::Initiated { .. }));
    assert!(matches!(events[1], TransferEvent::Succeeded { bytes, .. } if bytes > 0));
}

#[test]
fn test_offline_session_refuses_remote_access() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let remote = TestRepository::new().with_artifact("org.example:lib:1.0");
    let session = session(&engine, &local).with_offline(true);

    let err = engine
        .resolve(
            &session,
            &ArtifactRequest::new(
                artifact("org.example:lib:1.0"),
                vec![RemoteRepository::new("files", remote.url())],
            ),
        )
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Offline { ref repository, .. } if repository == "files"));
    local.assert_artifact_missing("org.example:lib:1.0");
}

#[test]
fn test_non_file_transport_is_unavailable() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let session = session(&engine, &local);

    let err = engine
        .resolve(
            &session,
            &ArtifactRequest::new(artifact("org.example:lib:1.0"), vec![RemoteRepository::central()]),
        )
        .unwrap_err();
    assert!(matches!(err, ResolutionError::TransportUnavailable { .. }));
}

#[test]
fn test_disabled_snapshot_policy_skips_repository() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let remote = TestRepository::new().with_artifact("org.example:lib:1.0-SNAPSHOT");
    let session = session(&engine, &local);

    let repository =
        RemoteRepository::new("files", remote.url()).with_snapshots(RepositoryPolicy::disabled());
    let err = engine
        .resolve(
            &session,
            &ArtifactRequest::new(artifact("org.example:lib:1.0-SNAPSHOT"), vec![repository]),
        )
        .unwrap_err();
    assert!(matches!(err, ResolutionError::NotFound { .. }));
}

#[test]
fn test_blocked_mirror_is_reported() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new();
    let remote = TestRepository::new().with_artifact("org.example:lib:1.0");
    let session = session(&engine, &local).with_mirror_selector(Arc::new(
        DefaultMirrorSelector::new().add("blocked", &remote.url(), None, true, "*", None),
    ));

    let repositories =
        engine.new_resolution_repositories(&session, &[RemoteRepository::new("files", remote.url())]);
    assert_eq!(repositories[0].id, "blocked");

    let err = engine
        .resolve(
            &session,
            &ArtifactRequest::new(artifact("org.example:lib:1.0"), repositories),
        )
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Blocked { .. }));
}

#[test]
fn test_shutdown_engine_rejects_requests() {
    let engine = FileRepositoryEngine::new();
    let local = TestRepository::new().with_artifact("org.example:lib:1.0");
    let session = session(&engine, &local);
    engine.shutdown();

    let err = engine
        .resolve(&session, &ArtifactRequest::new(artifact("org.example:lib:1.0"), vec![]))
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Shutdown));
}
