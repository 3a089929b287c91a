//! Idle task reaper: opt-in expiry of tasks nobody touched for `queue.task_ttl`.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::MediaQueue;

impl MediaQueue {
    /// Start the idle-task reaper background task
    ///
    /// Does nothing unless `queue.task_ttl` is configured; by default tasks are kept until
    /// explicitly deleted. The loop exits once shutdown has begun.
    pub fn start_reaper(&self) -> tokio::task::JoinHandle<()> {
        let Some(ttl) = self.config.queue.task_ttl else {
            tracing::info!("No task TTL configured, skipping idle reaper");
            return tokio::spawn(async {});
        };

        let queue = self.clone();
        let period = self.config.queue.reaper_interval;

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                if !queue.is_accepting() {
                    break;
                }
                queue.reap_idle(ttl, Utc::now()).await;
            }
        });

        tracing::info!(
            ttl_secs = ttl.as_secs(),
            interval_secs = period.as_secs(),
            "Idle reaper started"
        );

        handle
    }

    /// Clean up every task idle for longer than `ttl` as of `now`
    ///
    /// Returns the number of tasks removed.
    pub async fn reap_idle(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                tracing::warn!(error = %e, "Task TTL out of range, skipping reaper sweep");
                return 0;
            }
        };

        let Some(cutoff) = now.checked_sub_signed(ttl) else {
            tracing::warn!(
                ttl_secs = ttl.num_seconds(),
                "Task TTL reaches before the earliest representable time, nothing is idle yet"
            );
            return 0;
        };

        let mut removed = 0;
        for task_id in self.store.idle_since(cutoff).await {
            if self.cleanup_task(&task_id).await {
                tracing::info!(task_id = %task_id, "Reaped idle task");
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Idle reaper sweep complete");
        }
        removed
    }
}
