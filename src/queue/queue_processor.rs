//! Queue processor: the sequential loop that drains one task's items through the fetcher.

use crate::store::remove_file_best_effort;
use crate::types::{Event, TaskId};
use tokio_util::sync::CancellationToken;

use super::MediaQueue;

impl MediaQueue {
    /// Spawn the processing loop for a freshly created task
    ///
    /// Called exactly once per task, from [`create_task`](Self::create_task). The handle is
    /// not retained; the loop ends when the cursor reaches the end or the task is cleaned up.
    pub(crate) fn spawn_processor(&self, task_id: TaskId, cancel_token: CancellationToken) {
        let queue = self.clone();
        tokio::spawn(async move {
            queue.run_task(task_id, cancel_token).await;
        });
    }

    /// Process items strictly in input order, one external invocation at a time
    ///
    /// A failed item is recorded and the loop moves on; nothing is retried. Cancellation
    /// is checked between items only, so an in-flight invocation always runs to completion.
    async fn run_task(&self, task_id: TaskId, cancel_token: CancellationToken) {
        tracing::debug!(task_id = %task_id, fetcher = self.fetcher.name(), "Queue processor started");

        loop {
            if cancel_token.is_cancelled() {
                tracing::debug!(task_id = %task_id, "Task cancelled, stopping processor");
                return;
            }

            let Some(item) = self.store.begin_next_item(&task_id).await else {
                break;
            };

            tracing::info!(task_id = %task_id, index = item.index, url = %item.url, "Item started");
            self.emit_event(Event::ItemStarted {
                task_id: task_id.clone(),
                index: item.index,
            });

            match self.fetcher.fetch(&item.url, &item.format).await {
                Ok(file) => {
                    if !self.store.complete_item(&task_id, item.index, &file).await {
                        // Task was cleaned up while the fetch was running
                        tracing::debug!(
                            task_id = %task_id,
                            index = item.index,
                            "Discarding file fetched for removed task"
                        );
                        remove_file_best_effort(&task_id, &file.filepath).await;
                        return;
                    }

                    tracing::info!(
                        task_id = %task_id,
                        index = item.index,
                        filename = %file.filename,
                        "Item completed"
                    );
                    self.emit_event(Event::ItemCompleted {
                        task_id: task_id.clone(),
                        index: item.index,
                        filename: file.filename,
                    });
                }
                Err(e) => {
                    let message = e.to_string();
                    if !self
                        .store
                        .fail_item(&task_id, item.index, message.clone())
                        .await
                    {
                        return;
                    }

                    tracing::warn!(
                        task_id = %task_id,
                        index = item.index,
                        url = %item.url,
                        error = %e,
                        "Item failed"
                    );
                    self.emit_event(Event::ItemFailed {
                        task_id: task_id.clone(),
                        index: item.index,
                        error: message,
                    });
                }
            }
        }

        if let Some(outcome) = self.store.outcome(&task_id).await {
            tracing::info!(
                task_id = %task_id,
                completed = outcome.completed,
                failed = outcome.failed,
                "Task completed"
            );
            self.emit_event(Event::TaskCompleted {
                task_id,
                completed: outcome.completed,
                failed: outcome.failed,
            });
        }
    }
}
