//! Application state for the API server

use crate::{Config, MediaQueue};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; every field is Arc-backed.
#[derive(Clone)]
pub struct AppState {
    /// The queue that owns all tasks
    pub queue: MediaQueue,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(queue: MediaQueue, config: Arc<Config>) -> Self {
        Self { queue, config }
    }
}
