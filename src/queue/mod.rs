//! Core queue implementation split into focused submodules.
//!
//! The `MediaQueue` struct and its methods are organized by domain:
//! - [`tasks`] - Task creation, status, completed-file draining and cleanup
//! - [`queue_processor`] - The per-task sequential processing loop
//! - [`lifecycle`] - Shutdown coordination
//! - [`reaper`] - Optional expiry of idle tasks

mod lifecycle;
mod queue_processor;
mod reaper;
mod tasks;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{MediaFetcher, UnavailableFetcher, YtDlpFetcher};
use crate::store::TaskStore;
use crate::types::Event;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Event channel buffer size
const EVENT_BUFFER: usize = 1000;

/// Main queue instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaQueue {
    /// Task records, items, and completed-file queues
    pub(crate) store: Arc<TaskStore>,
    /// External fetch tool (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Flag to indicate whether new tasks are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl MediaQueue {
    /// Create a new MediaQueue instance
    ///
    /// Validates the configuration, creates the temp directory (removing `media-dl-*` files
    /// a previous run left there), and resolves the yt-dlp binary (explicit
    /// `tools.yt_dlp_path`, else PATH). If no binary can be found the queue still starts,
    /// but every item fails with an external tool error.
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn MediaFetcher> = match YtDlpFetcher::from_config(&config) {
            Some(fetcher) => {
                tracing::info!(
                    binary = %fetcher.binary_path().display(),
                    "yt-dlp fetcher initialized"
                );
                Arc::new(fetcher)
            }
            None => {
                tracing::warn!("yt-dlp binary not found, every item will fail until configured");
                Arc::new(UnavailableFetcher)
            }
        };

        Self::with_fetcher(config, fetcher).await
    }

    /// Create a MediaQueue with a custom fetcher implementation
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.temp_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create temp directory '{}': {}",
                        config.temp_dir().display(),
                        e
                    ),
                ))
            })?;

        let swept = lifecycle::sweep_stale_temp_files(config.temp_dir()).await;
        if swept > 0 {
            tracing::info!(swept, "Removed temp files left by a previous run");
        }

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_BUFFER);

        tracing::info!(
            fetcher = fetcher.name(),
            temp_dir = %config.temp_dir().display(),
            "Media queue initialized"
        );

        Ok(Self {
            store: Arc::new(TaskStore::new()),
            fetcher,
            config: Arc::new(config),
            event_tx,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to queue events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// If a subscriber falls behind by more than 1000 events, it will receive a
    /// `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{MediaQueue, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let queue = MediaQueue::new(Config::default()).await?;
    ///
    ///     let mut events = queue.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "queue event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the active fetcher implementation
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Whether new tasks are currently accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    /// Number of tasks currently held in memory
    pub async fn task_count(&self) -> usize {
        self.store.len().await
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let queue = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(queue, config).await })
    }
}
