//! In-memory task store
//!
//! Owns every task record, its work items, and its completed-file queue. State lives
//! only for the lifetime of the process. All mutation of a task's items goes through
//! the single queue processor loop for that task; API handlers only read, drain the
//! completed-file queue, or remove the task.

use crate::fetcher::FetchedFile;
use crate::types::{
    CompletedFile, ItemFile, ItemSnapshot, ItemStatus, TaskId, TaskSnapshot, TaskStatus, WorkItem,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One batch task
#[derive(Debug)]
pub struct TaskRecord {
    /// Work items in input order, fixed at creation
    pub items: Vec<WorkItem>,
    /// Index of the next item to process
    pub cursor: usize,
    /// Overall status
    pub status: TaskStatus,
    /// Completed files not yet drained by a client, in completion order
    pub completed_files: VecDeque<CompletedFile>,
    /// Last item transition or client access
    pub last_activity: DateTime<Utc>,
    /// Cancelled when the task is cleaned up
    pub(crate) cancel_token: CancellationToken,
}

impl TaskRecord {
    fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            cursor: 0,
            status: TaskStatus::Processing,
            completed_files: VecDeque::new(),
            last_activity: Utc::now(),
            cancel_token: CancellationToken::new(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            status: self.status,
            total: self.items.len(),
            completed_count: self
                .items
                .iter()
                .filter(|item| item.status == ItemStatus::Completed)
                .count(),
            cursor: self.cursor,
            items: self
                .items
                .iter()
                .map(|item| ItemSnapshot {
                    status: item.status,
                    filename: item.filename.clone(),
                    error: item.error.clone(),
                })
                .collect(),
        }
    }

    /// Advance past the current item and mark the task completed at the end
    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.items.len() {
            self.status = TaskStatus::Completed;
        }
        self.touch();
    }

    /// Whether `index` is the item currently downloading
    fn is_in_flight(&self, index: usize) -> bool {
        index == self.cursor
            && self
                .items
                .get(index)
                .is_some_and(|item| item.status == ItemStatus::Downloading)
    }
}

/// Item handed to the queue processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextItem {
    /// Item index
    pub index: usize,
    /// Source URL
    pub url: String,
    /// Format specifier
    pub format: String,
}

/// Final tally for a finished task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Items that completed
    pub completed: usize,
    /// Items that errored
    pub failed: usize,
}

/// In-memory mapping from task ID to task record
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Mutex<HashMap<TaskId, TaskRecord>>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new task with one pending item per URL
    ///
    /// Returns the fresh task ID and the token that [`cleanup`](Self::cleanup) cancels.
    pub async fn insert(&self, urls: Vec<String>, format: &str) -> (TaskId, CancellationToken) {
        let items = urls
            .into_iter()
            .map(|url| WorkItem::new(url, format))
            .collect();
        let record = TaskRecord::new(items);
        let token = record.cancel_token.clone();

        let mut tasks = self.tasks.lock().await;
        let mut id = TaskId::generate();
        while tasks.contains_key(&id) {
            id = TaskId::generate();
        }
        tasks.insert(id.clone(), record);

        (id, token)
    }

    /// Read-only projection of a task, or None if unknown
    pub async fn snapshot(&self, id: &TaskId) -> Option<TaskSnapshot> {
        let mut tasks = self.tasks.lock().await;
        let record = tasks.get_mut(id)?;
        record.touch();
        Some(record.snapshot())
    }

    /// Remove and return the oldest undrained completed-file descriptor
    ///
    /// The outer `None` means the task is unknown; `Some(None)` means nothing is waiting.
    pub async fn drain_next_completed(&self, id: &TaskId) -> Option<Option<CompletedFile>> {
        let mut tasks = self.tasks.lock().await;
        let record = tasks.get_mut(id)?;
        record.touch();
        Some(record.completed_files.pop_front())
    }

    /// File handle for an item, only if that item is exactly `completed`
    pub async fn item_file(&self, id: &TaskId, index: usize) -> Option<ItemFile> {
        let mut tasks = self.tasks.lock().await;
        let record = tasks.get_mut(id)?;
        record.touch();

        let item = record.items.get(index)?;
        if item.status != ItemStatus::Completed {
            return None;
        }
        Some(ItemFile {
            filename: item.filename.clone()?,
            filepath: item.filepath.clone()?,
        })
    }

    /// Number of tasks currently stored
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// IDs of every stored task
    pub async fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.lock().await.keys().cloned().collect()
    }

    /// IDs of tasks with no activity since `cutoff`
    pub async fn idle_since(&self, cutoff: DateTime<Utc>) -> Vec<TaskId> {
        self.tasks
            .lock()
            .await
            .iter()
            .filter(|(_, record)| record.last_activity < cutoff)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Remove a task and delete its files
    ///
    /// Cancels the task's processor token, removes the record and its completed-file
    /// queue, then deletes every populated `filepath` that still exists. Deletion failures
    /// are logged, not returned. Returns whether a task was actually removed; unknown IDs
    /// are a no-op.
    pub async fn cleanup(&self, id: &TaskId) -> bool {
        let record = {
            let mut tasks = self.tasks.lock().await;
            tasks.remove(id)
        };

        let Some(record) = record else {
            return false;
        };
        record.cancel_token.cancel();

        let paths: Vec<PathBuf> = record
            .items
            .into_iter()
            .filter_map(|item| item.filepath)
            .collect();
        for path in paths {
            remove_file_best_effort(id, &path).await;
        }

        true
    }

    // ------------------------------------------------------------------
    // Queue processor operations
    // ------------------------------------------------------------------

    /// Mark the item at the cursor `downloading` and hand it out
    ///
    /// Returns None once the cursor reached the end, or if the task was removed.
    pub(crate) async fn begin_next_item(&self, id: &TaskId) -> Option<NextItem> {
        let mut tasks = self.tasks.lock().await;
        let record = tasks.get_mut(id)?;
        let index = record.cursor;
        let item = record.items.get_mut(index)?;
        if item.status != ItemStatus::Pending {
            return None;
        }

        item.status = ItemStatus::Downloading;
        let next = NextItem {
            index,
            url: item.url.clone(),
            format: item.format.clone(),
        };
        record.touch();
        Some(next)
    }

    /// Record a successful fetch for the in-flight item and queue its descriptor
    ///
    /// Returns false if the task no longer exists (or the item is not in flight); the
    /// caller then owns the fetched file.
    pub(crate) async fn complete_item(&self, id: &TaskId, index: usize, file: &FetchedFile) -> bool {
        let mut tasks = self.tasks.lock().await;
        let Some(record) = tasks.get_mut(id) else {
            return false;
        };
        if !record.is_in_flight(index) {
            return false;
        }

        let item = &mut record.items[index];
        item.status = ItemStatus::Completed;
        item.filename = Some(file.filename.clone());
        item.filepath = Some(file.filepath.clone());

        record.completed_files.push_back(CompletedFile {
            index,
            filename: file.filename.clone(),
            filepath: file.filepath.clone(),
        });
        record.advance();
        true
    }

    /// Record a failed fetch for the in-flight item
    ///
    /// Returns false if the task no longer exists (or the item is not in flight).
    pub(crate) async fn fail_item(&self, id: &TaskId, index: usize, message: String) -> bool {
        let mut tasks = self.tasks.lock().await;
        let Some(record) = tasks.get_mut(id) else {
            return false;
        };
        if !record.is_in_flight(index) {
            return false;
        }

        let item = &mut record.items[index];
        item.status = ItemStatus::Error;
        item.error = Some(message);
        record.advance();
        true
    }

    /// Completed/failed tally, only once the task status is `completed`
    pub(crate) async fn outcome(&self, id: &TaskId) -> Option<TaskOutcome> {
        let tasks = self.tasks.lock().await;
        let record = tasks.get(id)?;
        if record.status != TaskStatus::Completed {
            return None;
        }
        let count = |status: ItemStatus| record.items.iter().filter(|i| i.status == status).count();
        Some(TaskOutcome {
            completed: count(ItemStatus::Completed),
            failed: count(ItemStatus::Error),
        })
    }
}

/// Delete a task-owned file if it still exists
pub(crate) async fn remove_file_best_effort(id: &TaskId, path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(task_id = %id, path = %path.display(), "Removed task file");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                task_id = %id,
                path = %path.display(),
                error = %e,
                "Failed to remove task file, it may be leaked"
            );
        }
    }
}
