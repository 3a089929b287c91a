//! # media-dl
//!
//! Sequential batch media download queue over `yt-dlp`, exposed through an HTTP API.
//!
//! A client submits a list of URLs and a format specifier; the queue downloads them one at
//! a time in the background while the client polls status and retrieves each finished file
//! as soon as it is ready. Tasks live in memory until they are deleted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{MediaQueue, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = MediaQueue::new(Config::default()).await?;
//!
//!     let (task_id, total) = queue
//!         .create_task(
//!             vec!["https://example.com/watch?v=abc".to_string()],
//!             "bestaudio--mp3",
//!         )
//!         .await?;
//!     println!("task {task_id} with {total} item(s)");
//!
//!     let mut events = queue.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External fetch tool invocation
pub mod fetcher;
/// Format specifier parsing
pub mod format;
/// Task queue (decomposed into focused submodules)
pub mod queue;
/// In-memory task store
pub mod store;
/// Core types and events
pub mod types;
/// Filename helpers
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, QueueConfig, ServerIntegrationConfig, ToolsConfig};
pub use error::{ApiError, Error, ErrorDetail, FetchError, Result, ToHttpStatus};
pub use fetcher::{FetchedFile, MediaFetcher, ProcessRunner, UnavailableFetcher, YtDlpFetcher};
pub use format::FormatSpec;
pub use queue::MediaQueue;
pub use store::TaskStore;
pub use types::{
    CompletedFile, Event, ItemFile, ItemSnapshot, ItemStatus, TaskId, TaskSnapshot, TaskStatus,
    WorkItem,
};

/// Helper function to run the queue with graceful signal handling.
///
/// Waits for a termination signal and then calls the queue's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{MediaQueue, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let queue = MediaQueue::new(Config::default()).await?;
///     let _server = queue.spawn_api_server();
///
///     run_with_shutdown(queue).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(queue: MediaQueue) -> Result<()> {
    wait_for_signal().await;
    queue.shutdown().await
}

/// Resolve once SIGINT or SIGTERM (Ctrl+C elsewhere) is received
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Resolve once Ctrl+C is received
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
