//! Shared test helpers for creating MediaQueue instances in tests.

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::{FetchedFile, MediaFetcher};
use crate::queue::MediaQueue;
use crate::types::{TaskId, TaskSnapshot, TaskStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Semaphore;

/// Scripted result for one URL
#[derive(Debug, Clone)]
pub(crate) enum StubOutcome {
    /// Write a file and report it under this display filename
    Succeed(&'static str),
    /// Fail like a non-zero tool exit with this diagnostic
    Fail(&'static str),
}

/// In-process fetcher that records call order and scripts per-URL outcomes
///
/// URLs without a scripted outcome succeed as `download.mp3`. When gated, every fetch
/// blocks until the test releases a permit.
pub(crate) struct StubFetcher {
    dir: PathBuf,
    outcomes: HashMap<String, StubOutcome>,
    calls: Mutex<Vec<String>>,
    produced: Mutex<Vec<PathBuf>>,
    gate: Option<Arc<Semaphore>>,
}

impl StubFetcher {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            produced: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub(crate) fn with_outcome(mut self, url: &str, outcome: StubOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    /// Hold every fetch until a permit is added to the returned semaphore
    pub(crate) fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// URLs in the order fetch was called
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths of every file this stub wrote
    pub(crate) fn produced(&self) -> Vec<PathBuf> {
        self.produced.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn fetch(&self, url: &str, _format: &str) -> Result<FetchedFile, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        match self
            .outcomes
            .get(url)
            .cloned()
            .unwrap_or(StubOutcome::Succeed("download.mp3"))
        {
            StubOutcome::Succeed(filename) => {
                let filepath = self
                    .dir
                    .join(format!("media-dl-{}.mp3", uuid::Uuid::new_v4()));
                tokio::fs::write(&filepath, url.as_bytes()).await.unwrap();
                self.produced.lock().unwrap().push(filepath.clone());
                Ok(FetchedFile {
                    filename: filename.to_string(),
                    filepath,
                })
            }
            StubOutcome::Fail(diagnostics) => Err(FetchError::FetchFailed {
                exit_code: Some(1),
                diagnostics: diagnostics.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Config pointing the temp dir inside a fresh tempdir
pub(crate) fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.queue.temp_dir = temp_dir.path().join("temp");
    config.tools.search_path = false;
    config
}

/// Helper to create a test MediaQueue around a stub fetcher.
/// Returns the queue, the fetcher, and the tempdir (which must be kept alive).
pub(crate) async fn create_test_queue_with(
    build: impl FnOnce(StubFetcher) -> StubFetcher,
) -> (MediaQueue, Arc<StubFetcher>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir);
    std::fs::create_dir_all(config.temp_dir()).unwrap();

    let fetcher = Arc::new(build(StubFetcher::new(config.temp_dir().clone())));
    let queue = MediaQueue::with_fetcher(config, fetcher.clone())
        .await
        .unwrap();

    (queue, fetcher, temp_dir)
}

/// Helper to create a test MediaQueue whose fetches all succeed
pub(crate) async fn create_test_queue() -> (MediaQueue, Arc<StubFetcher>, tempfile::TempDir) {
    create_test_queue_with(|fetcher| fetcher).await
}

/// Helper to create a test MediaQueue whose fetches block until permits are added
pub(crate) async fn create_gated_test_queue() -> (
    MediaQueue,
    Arc<StubFetcher>,
    Arc<Semaphore>,
    tempfile::TempDir,
) {
    let mut gate = None;
    let (queue, fetcher, temp_dir) = create_test_queue_with(|fetcher| {
        let (fetcher, semaphore) = fetcher.gated();
        gate = Some(semaphore);
        fetcher
    })
    .await;

    (queue, fetcher, gate.unwrap(), temp_dir)
}

/// Poll until the task reports `completed`, panicking after a few seconds
pub(crate) async fn wait_for_completion(queue: &MediaQueue, task_id: &TaskId) -> TaskSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = queue.task_status(task_id).await.unwrap();
            if snapshot.status == TaskStatus::Completed {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("task did not complete in time")
}

/// Poll until the stub has received `count` fetch calls
pub(crate) async fn wait_for_calls(fetcher: &StubFetcher, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while fetcher.calls().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("fetcher was not called in time");
}
