//! Core types for media-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Opaque unique identifier for a batch task
///
/// Generated from a random UUID at creation time and never reused.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Allocate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Overall progress of a task. There is deliberately no failed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Items remain to be processed
    Processing,
    /// Cursor reached the end of the item list (terminal)
    Completed,
}

/// Per-item status, strictly forward-moving
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Not reached yet
    Pending,
    /// External tool invocation in flight
    Downloading,
    /// File retrieved and owned by the task
    Completed,
    /// Invocation failed; the message is kept on the item
    Error,
}

/// One URL's processing record within a task
#[derive(Clone, Debug)]
pub struct WorkItem {
    /// Source identifier as supplied by the client
    pub url: String,
    /// Format specifier applied to this item
    pub format: String,
    /// Current status
    pub status: ItemStatus,
    /// Sanitized display name, set only on `completed`
    pub filename: Option<String>,
    /// Local file owned by the task, set only on `completed`
    pub filepath: Option<PathBuf>,
    /// Failure message, set only on `error`
    pub error: Option<String>,
}

impl WorkItem {
    /// Create a pending item
    pub fn new(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: format.into(),
            status: ItemStatus::Pending,
            filename: None,
            filepath: None,
            error: None,
        }
    }
}

/// Descriptor queued when an item completes, awaiting client retrieval
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedFile {
    /// Position of the item within the task
    pub index: usize,
    /// Display filename
    pub filename: String,
    /// Local file path
    pub filepath: PathBuf,
}

/// File handle for one completed item
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemFile {
    /// Display filename
    pub filename: String,
    /// Local file path
    pub filepath: PathBuf,
}

/// Read-only projection of a task
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Overall status
    pub status: TaskStatus,
    /// Number of items in the task
    pub total: usize,
    /// Items whose status is `completed` at the time of the call
    pub completed_count: usize,
    /// Index of the next item to process
    pub cursor: usize,
    /// Per-item projection in input order
    pub items: Vec<ItemSnapshot>,
}

/// Per-item projection inside a [`TaskSnapshot`]
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemSnapshot {
    /// Item status
    pub status: ItemStatus,
    /// Display filename (completed items only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Failure message (errored items only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Events emitted by the queue
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task was created and its processor started
    TaskCreated {
        /// Task ID
        task_id: TaskId,
        /// Number of items
        total: usize,
    },

    /// An item moved to `downloading`
    ItemStarted {
        /// Task ID
        task_id: TaskId,
        /// Item index
        index: usize,
    },

    /// An item completed and its file is ready to drain
    ItemCompleted {
        /// Task ID
        task_id: TaskId,
        /// Item index
        index: usize,
        /// Display filename
        filename: String,
    },

    /// An item failed; remaining items continue
    ItemFailed {
        /// Task ID
        task_id: TaskId,
        /// Item index
        index: usize,
        /// Failure message
        error: String,
    },

    /// Every item has been processed
    TaskCompleted {
        /// Task ID
        task_id: TaskId,
        /// Number of completed items
        completed: usize,
        /// Number of errored items
        failed: usize,
    },

    /// A task and its files were removed
    TaskRemoved {
        /// Task ID
        task_id: TaskId,
    },

    /// The queue is shutting down
    Shutdown,
}

impl Event {
    /// Name used for the SSE `event:` field
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TaskCreated { .. } => "task_created",
            Event::ItemStarted { .. } => "item_started",
            Event::ItemCompleted { .. } => "item_completed",
            Event::ItemFailed { .. } => "item_failed",
            Event::TaskCompleted { .. } => "task_completed",
            Event::TaskRemoved { .. } => "task_removed",
            Event::Shutdown => "shutdown",
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_task_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn snapshot_serializes_with_camel_case_and_lowercase_statuses() {
        let snapshot = TaskSnapshot {
            status: TaskStatus::Completed,
            total: 2,
            completed_count: 1,
            cursor: 2,
            items: vec![
                ItemSnapshot {
                    status: ItemStatus::Completed,
                    filename: Some("a.mp3".into()),
                    error: None,
                },
                ItemSnapshot {
                    status: ItemStatus::Error,
                    filename: None,
                    error: Some("exit 1".into()),
                },
            ],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["completedCount"], 1);
        assert_eq!(json["items"][0]["filename"], "a.mp3");
        assert!(json["items"][0].get("error").is_none());
        assert_eq!(json["items"][1]["status"], "error");
    }

    #[test]
    fn event_is_tagged_with_type() {
        let event = Event::ItemCompleted {
            task_id: TaskId::from("t"),
            index: 0,
            filename: "a.mp3".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "item_completed");
        assert_eq!(json["task_id"], "t");
        assert_eq!(event.kind(), "item_completed");
    }
}
