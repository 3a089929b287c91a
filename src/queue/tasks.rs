//! Task operations exposed to API handlers: create, status, drain, download, cleanup.

use crate::error::{Error, Result};
use crate::types::{CompletedFile, Event, ItemFile, TaskId, TaskSnapshot};
use std::sync::atomic::Ordering;

use super::MediaQueue;

impl MediaQueue {
    /// Create a batch task and start processing it in the background
    ///
    /// Every URL becomes one pending item carrying the same `format`. The task ID is
    /// returned immediately; processing runs on its own spawned loop.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if `urls` is empty
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    pub async fn create_task(&self, urls: Vec<String>, format: &str) -> Result<(TaskId, usize)> {
        if urls.is_empty() {
            return Err(Error::InvalidRequest(
                "urls must be a non-empty array".to_string(),
            ));
        }

        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let total = urls.len();
        let (task_id, cancel_token) = self.store.insert(urls, format).await;

        tracing::info!(task_id = %task_id, total, format, "Task created");
        self.emit_event(Event::TaskCreated {
            task_id: task_id.clone(),
            total,
        });

        self.spawn_processor(task_id.clone(), cancel_token);

        Ok((task_id, total))
    }

    /// Read-only projection of a task
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] for unknown or cleaned-up tasks.
    pub async fn task_status(&self, task_id: &TaskId) -> Result<TaskSnapshot> {
        self.store
            .snapshot(task_id)
            .await
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// Remove and return the oldest completed file not yet handed to a client
    ///
    /// Returns `Ok(None)` when nothing is waiting right now, even if items are still
    /// in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskNotFound`] for unknown or cleaned-up tasks.
    pub async fn next_completed(&self, task_id: &TaskId) -> Result<Option<CompletedFile>> {
        self.store
            .drain_next_completed(task_id)
            .await
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// Locate the file for a completed item
    ///
    /// Independent of draining: the same item may be fetched repeatedly until cleanup.
    /// Returns `None` if the task is unknown, the index is out of range, the item is not
    /// `completed`, or the file is gone from disk.
    pub async fn item_file(&self, task_id: &TaskId, index: usize) -> Option<ItemFile> {
        let file = self.store.item_file(task_id, index).await?;
        match tokio::fs::try_exists(&file.filepath).await {
            Ok(true) => Some(file),
            _ => {
                tracing::warn!(
                    task_id = %task_id,
                    index,
                    path = %file.filepath.display(),
                    "Completed item file missing from disk"
                );
                None
            }
        }
    }

    /// Remove a task and delete its files
    ///
    /// Idempotent: unknown IDs succeed silently. Returns whether a task was removed.
    /// An in-flight item is cancelled cooperatively; its file is deleted by the processor
    /// when the fetch returns.
    pub async fn cleanup_task(&self, task_id: &TaskId) -> bool {
        let removed = self.store.cleanup(task_id).await;
        if removed {
            tracing::info!(task_id = %task_id, "Task cleaned up");
            self.emit_event(Event::TaskRemoved {
                task_id: task_id.clone(),
            });
        } else {
            tracing::debug!(task_id = %task_id, "Cleanup requested for unknown task");
        }
        removed
    }
}
