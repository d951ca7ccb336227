pub mod poller;

use std::collections::HashMap;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct RunningTask {
    handle: JoinHandle<()>,
    token: CancellationToken,
}

/// Manages keyed background tasks (import pollers)
/// Tracks running tasks and provides cooperative cancellation
pub struct BackgroundTaskManager {
    tasks: HashMap<String, RunningTask>,
}

impl BackgroundTaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a background task under `key`
    /// If a task with the same key already exists, it is cancelled first
    pub fn spawn_task<F, Fut>(&mut self, key: impl Into<String>, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let key = key.into();
        if self.cancel(&key) {
            tracing::debug!("Replaced background task {}", key);
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(task(token.clone()));
        self.tasks.insert(key, RunningTask { handle, token });
    }

    /// Signal the task under `key` to stop. Returns false if there was none.
    pub fn cancel(&mut self, key: &str) -> bool {
        match self.tasks.remove(key) {
            Some(task) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel all running tasks (used on shutdown)
    pub fn cancel_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.token.cancel();
        }
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Forget tasks that already ran to completion.
    pub fn prune(&mut self) {
        self.tasks.retain(|_, task| !task.handle.is_finished());
    }
}

impl Default for BackgroundTaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackgroundTaskManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
