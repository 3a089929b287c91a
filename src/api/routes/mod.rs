//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`queue`] - Task lifecycle
//! - [`system`] - Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod queue;
mod system;

pub use queue::*;
pub use system::*;

/// Format used when a create request omits one
pub const DEFAULT_FORMAT: &str = "best";

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

/// Request body for POST /queue/create
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateTaskRequest {
    /// Source URLs, processed in this order
    pub urls: Vec<String>,
    /// Format specifier applied to every item (`<selector>` or `<selector>--<target>`)
    #[serde(default = "default_format")]
    pub format: String,
}

/// Response for POST /queue/create
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    /// Identifier of the new task
    pub task_id: String,
    /// Number of items in the task
    pub total: usize,
}

/// Response for GET /queue/next/:task_id
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextFileResponse {
    /// Whether a completed file was waiting
    pub has_file: bool,
    /// Item index of the drained file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Display filename of the drained file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Response for DELETE /queue/:task_id
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    /// Always true
    pub success: bool,
}
