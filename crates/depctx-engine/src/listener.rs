//! Transfer and repository event listeners

use depctx_model::Artifact;
use std::path::PathBuf;
use std::sync::Arc;

/// Events describing the progress of an artifact resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    ArtifactResolving {
        artifact: Artifact,
    },
    ArtifactResolved {
        artifact: Artifact,
        /// Id of the repository that delivered the file, `local` for the cache
        repository: String,
        file: Option<PathBuf>,
    },
}

/// Events describing a single download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Initiated {
        repository: String,
        resource: String,
    },
    Succeeded {
        repository: String,
        resource: String,
        bytes: u64,
    },
    Failed {
        repository: String,
        resource: String,
        message: String,
    },
}

pub trait TransferListener: Send + Sync {
    fn on_transfer(&self, event: &TransferEvent);
}

pub trait RepositoryListener: Send + Sync {
    fn on_repository_event(&self, event: &RepositoryEvent);
}

/// Forwards transfer events to several listeners, in order
pub struct ChainedTransferListener {
    listeners: Vec<Arc<dyn TransferListener>>,
}

impl ChainedTransferListener {
    pub fn new(listeners: Vec<Arc<dyn TransferListener>>) -> Self {
        Self { listeners }
    }

    /// Chain `added` after `existing`, or return `added` when there is none.
    pub fn chain(
        existing: Option<Arc<dyn TransferListener>>,
        added: Arc<dyn TransferListener>,
    ) -> Arc<dyn TransferListener> {
        match existing {
            Some(existing) => Arc::new(Self::new(vec![existing, added])),
            None => added,
        }
    }
}

impl TransferListener for ChainedTransferListener {
    fn on_transfer(&self, event: &TransferEvent) {
        for listener in &self.listeners {
            listener.on_transfer(event);
        }
    }
}

/// Forwards repository events to several listeners, in order
pub struct ChainedRepositoryListener {
    listeners: Vec<Arc<dyn RepositoryListener>>,
}

impl ChainedRepositoryListener {
    pub fn new(listeners: Vec<Arc<dyn RepositoryListener>>) -> Self {
        Self { listeners }
    }

    /// Chain `added` after `existing`, or return `added` when there is none.
    pub fn chain(
        existing: Option<Arc<dyn RepositoryListener>>,
        added: Arc<dyn RepositoryListener>,
    ) -> Arc<dyn RepositoryListener> {
        match existing {
            Some(existing) => Arc::new(Self::new(vec![existing, added])),
            None => added,
        }
    }
}

impl RepositoryListener for ChainedRepositoryListener {
    fn on_repository_event(&self, event: &RepositoryEvent) {
        for listener in &self.listeners {
            listener.on_repository_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RepositoryListener for Recorder {
        fn on_repository_event(&self, _event: &RepositoryEvent) {
            self.log.lock().unwrap().push(self.name.to_string());
        }
    }

    impl TransferListener for Recorder {
        fn on_transfer(&self, _event: &TransferEvent) {
            self.log.lock().unwrap().push(self.name.to_string());
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn chain_without_existing_returns_added() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chained = ChainedRepositoryListener::chain(None, recorder("only", &log));
        chained.on_repository_event(&RepositoryEvent::ArtifactResolving {
            artifact: Artifact::new("g", "a", "1"),
        });
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[test]
    fn chain_invokes_parent_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let parent: Arc<dyn TransferListener> = recorder("parent", &log);
        let chained = ChainedTransferListener::chain(Some(parent), recorder("child", &log));
        chained.on_transfer(&TransferEvent::Initiated {
            repository: "central".into(),
            resource: "g/a/1/a-1.jar".into(),
        });
        assert_eq!(*log.lock().unwrap(), vec!["parent", "child"]);
    }
}
