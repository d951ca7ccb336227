use crate::remote::TaskSource;
use finflow_api::endpoints::tasks::{TaskStatus, TaskStatusResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay before every status query, including the first.
    pub interval: Duration,
    /// Status queries issued before giving up.
    pub max_attempts: u32,
    /// Consecutive failed queries that end the job as failed. `None` treats
    /// every failed query as "still pending".
    pub max_consecutive_errors: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_consecutive_errors: None,
        }
    }
}

/// How a polled task ended, from the client's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(Option<serde_json::Value>),
    Failed(Option<String>),
    /// Attempts ran out; the server may still finish the job.
    TimedOut,
    Cancelled,
}

pub struct TaskPoller<S> {
    source: Arc<S>,
    config: PollerConfig,
}

impl<S> Clone for TaskPoller<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            config: self.config,
        }
    }
}

impl<S: TaskSource> TaskPoller<S> {
    pub fn new(source: Arc<S>, config: PollerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Poll `task_id` until it reaches a terminal state, attempts run out or
    /// `cancel` fires. Issues at most one status query per attempt.
    pub async fn run(&self, task_id: &str, cancel: &CancellationToken) -> TaskOutcome {
        let max_attempts = self.config.max_attempts;
        let mut consecutive_errors = 0u32;

        for attempt in 1..=max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(task_id),
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(task_id),
                status = self.source.task_status(task_id.to_string()) => status,
            };

            match status {
                Ok(response) => {
                    consecutive_errors = 0;
                    if response.status.is_terminal() {
                        return self.finished(task_id, attempt, response);
                    }
                    tracing::debug!(
                        "Task {} still {:?} ({}/{})",
                        task_id,
                        response.status,
                        attempt,
                        max_attempts
                    );
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        "Status query for task {} failed ({} in a row): {}",
                        task_id,
                        consecutive_errors,
                        e
                    );
                    if let Some(limit) = self.config.max_consecutive_errors {
                        if consecutive_errors >= limit {
                            return TaskOutcome::Failed(Some(e.to_string()));
                        }
                    }
                }
            }
        }

        tracing::warn!(
            "Stopped polling task {} after {} attempts",
            task_id,
            max_attempts
        );
        TaskOutcome::TimedOut
    }

    fn finished(&self, task_id: &str, attempt: u32, response: TaskStatusResponse) -> TaskOutcome {
        if response.status == TaskStatus::Failed {
            tracing::error!(
                "Task {} failed: {}",
                task_id,
                response.error.as_deref().unwrap_or("no detail")
            );
            return TaskOutcome::Failed(response.error);
        }
        tracing::info!("Task {} completed after {} polls", task_id, attempt);
        TaskOutcome::Completed(response.result)
    }

    fn cancelled(&self, task_id: &str) -> TaskOutcome {
        tracing::info!("Polling for task {} cancelled", task_id);
        TaskOutcome::Cancelled
    }
}
