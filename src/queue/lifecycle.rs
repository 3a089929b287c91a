//! Startup housekeeping and shutdown coordination.

use crate::error::Result;
use crate::fetcher::TEMP_FILE_PREFIX;
use crate::types::Event;
use std::path::Path;
use std::sync::atomic::Ordering;

use super::MediaQueue;

impl MediaQueue {
    /// Gracefully shut down the queue
    ///
    /// 1. Stops accepting new tasks ([`create_task`](Self::create_task) returns
    ///    [`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Cleans up every task, which cancels its processor and deletes its files
    /// 3. Emits [`Event::Shutdown`]
    ///
    /// Files produced by invocations still in flight are deleted by their processor when
    /// the invocation returns.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new tasks");

        let task_ids = self.store.task_ids().await;
        let task_count = task_ids.len();
        for task_id in task_ids {
            self.cleanup_task(&task_id).await;
        }
        tracing::info!(task_count, "Removed all tasks");

        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}

/// Delete per-invocation files a previous process left in `dir`
///
/// An invocation still running when the process exits is killed with it, leaving its
/// partial `media-dl-*` output behind. Returns the number of files removed.
pub(crate) async fn sweep_stale_temp_files(dir: &Path) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not scan temp directory");
            return 0;
        }
    };

    let mut removed = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if !entry.file_name().to_string_lossy().starts_with(TEMP_FILE_PREFIX) {
            continue;
        }
        let path = entry.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
            }
        }
    }
    removed
}
