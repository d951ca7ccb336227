use crate::background::poller::{PollerConfig, TaskOutcome, TaskPoller};
use crate::background::BackgroundTaskManager;
use crate::events::DataEvent;
use crate::remote::TaskSource;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use finflow_api::endpoints::csv::{
    ColumnMapping, ImportCsv, ImportResponse, ImportRowError, ImportStatus, DEFAULT_DATE_FORMAT,
};
use finflow_api::Request;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const TASK_FAILED: &str = "Import task failed";

/// A mapped CSV file ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub csv_text: String,
    pub mapping: ColumnMapping,
    pub date_format: String,
}

impl ImportRequest {
    pub fn new(csv_text: impl Into<String>, mapping: ColumnMapping) -> Self {
        Self {
            csv_text: csv_text.into(),
            mapping,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    fn encode(&self) -> ImportCsv {
        Request::csv()
            .import(STANDARD.encode(&self.csv_text), self.mapping.clone())
            .date_format(self.date_format.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowError {
    pub row: u64,
    #[serde(rename = "error")]
    pub message: String,
}

impl From<ImportRowError> for RowError {
    fn from(e: ImportRowError) -> Self {
        Self {
            row: e.row,
            message: e.error,
        }
    }
}

/// Final tally of an import. Row errors do not fail the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub status: ImportStatus,
    pub created_count: u64,
    pub error_count: u64,
    pub errors: Vec<RowError>,
}

/// Shape of the `result` payload of a finished import task.
#[derive(Debug, Default, Deserialize)]
struct TaskResult {
    #[serde(default)]
    created_count: u64,
    #[serde(default)]
    error_count: u64,
    #[serde(default)]
    errors: Vec<RowError>,
}

impl ImportSummary {
    /// A failure that is not tied to a row (reported as row 0).
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Failed,
            created_count: 0,
            error_count: 1,
            errors: vec![RowError {
                row: 0,
                message: message.into(),
            }],
        }
    }

    fn from_response(response: ImportResponse) -> Self {
        let errors: Vec<RowError> = response
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(RowError::from)
            .collect();
        Self {
            status: response.status,
            created_count: response.created_count.unwrap_or(0),
            error_count: response.error_count.unwrap_or(errors.len() as u64),
            errors,
        }
    }

    /// Read counts from a completed task's result. Missing or malformed
    /// fields count as zero.
    pub fn from_task_result(result: Option<serde_json::Value>) -> Self {
        let result = result
            .and_then(|value| match serde_json::from_value::<TaskResult>(value) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Unreadable import task result: {}", e);
                    None
                }
            })
            .unwrap_or_default();
        Self {
            status: ImportStatus::Completed,
            created_count: result.created_count,
            error_count: result.error_count,
            errors: result.errors,
        }
    }

    /// Summary for a terminal poll outcome. `None` when the outcome is
    /// unknown (timed out or cancelled).
    pub fn from_outcome(outcome: TaskOutcome) -> Option<Self> {
        match outcome {
            TaskOutcome::Completed(result) => Some(Self::from_task_result(result)),
            TaskOutcome::Failed(detail) => {
                Some(Self::failed(detail.unwrap_or_else(|| TASK_FAILED.to_string())))
            }
            TaskOutcome::TimedOut | TaskOutcome::Cancelled => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ImportStatus::Failed
    }

    /// First `limit` row errors and how many more were left out.
    pub fn preview_errors(&self, limit: usize) -> (&[RowError], usize) {
        let shown = self.errors.len().min(limit);
        (&self.errors[..shown], self.errors.len() - shown)
    }
}

/// Result of submitting a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Finished(ImportSummary),
    /// Accepted as a background job with this task id.
    Pending(String),
}

pub struct Importer<S> {
    source: Arc<S>,
    poller: TaskPoller<S>,
}

impl<S: TaskSource> Importer<S> {
    pub fn new(source: Arc<S>, config: PollerConfig) -> Self {
        Self {
            poller: TaskPoller::new(source.clone(), config),
            source,
        }
    }

    pub fn poller(&self) -> &TaskPoller<S> {
        &self.poller
    }

    /// Send the file. Submission errors come back as a failed summary so the
    /// caller always has something to show.
    pub async fn submit(&self, request: &ImportRequest) -> ImportOutcome {
        tracing::info!(
            "Submitting CSV import ({} bytes, date format {})",
            request.csv_text.len(),
            request.date_format
        );
        match self.source.import_csv(request.encode()).await {
            Ok(response) => match (response.status, response.task_id.clone()) {
                (ImportStatus::Pending, Some(task_id)) => {
                    tracing::info!("Import queued as task {}", task_id);
                    ImportOutcome::Pending(task_id)
                }
                (ImportStatus::Pending, None) => {
                    tracing::error!("Import reported pending without a task id");
                    ImportOutcome::Finished(ImportSummary::failed(TASK_FAILED))
                }
                _ => {
                    let summary = ImportSummary::from_response(response);
                    tracing::info!(
                        "Import finished: {} created, {} errors",
                        summary.created_count,
                        summary.error_count
                    );
                    ImportOutcome::Finished(summary)
                }
            },
            Err(e) => {
                tracing::error!("Import submission failed: {}", e);
                ImportOutcome::Finished(ImportSummary::failed(e.to_string()))
            }
        }
    }

    /// Submit and, if the server queued a job, poll it to the end. `None`
    /// means polling stopped before the job reached a terminal state.
    pub async fn import_and_wait(
        &self,
        request: &ImportRequest,
        cancel: &CancellationToken,
    ) -> Option<ImportSummary> {
        match self.submit(request).await {
            ImportOutcome::Finished(summary) => Some(summary),
            ImportOutcome::Pending(task_id) => {
                ImportSummary::from_outcome(self.poller.run(&task_id, cancel).await)
            }
        }
    }

    /// Poll `task_id` in the background and report the result once on
    /// `events`. A second watch on the same task replaces the first.
    pub fn watch(
        &self,
        manager: &mut BackgroundTaskManager,
        task_id: String,
        events: mpsc::UnboundedSender<DataEvent>,
    ) {
        let poller = self.poller.clone();
        let key = format!("import:{}", task_id);
        manager.spawn_task(key, move |token| async move {
            let outcome = poller.run(&task_id, &token).await;
            let event = match outcome {
                TaskOutcome::TimedOut => DataEvent::ImportTimedOut { task_id },
                TaskOutcome::Cancelled => DataEvent::ImportCancelled { task_id },
                outcome => match ImportSummary::from_outcome(outcome) {
                    Some(summary) => DataEvent::ImportFinished {
                        task_id: Some(task_id),
                        summary,
                    },
                    None => return,
                },
            };
            let _ = events.send(event);
        });
    }

    /// Submit and route the result through `events`: immediate results are
    /// sent right away, queued jobs are watched.
    pub async fn start(
        &self,
        request: &ImportRequest,
        manager: &mut BackgroundTaskManager,
        events: mpsc::UnboundedSender<DataEvent>,
    ) {
        match self.submit(request).await {
            ImportOutcome::Finished(summary) => {
                let _ = events.send(DataEvent::ImportFinished {
                    task_id: None,
                    summary,
                });
            }
            ImportOutcome::Pending(task_id) => {
                let _ = events.send(DataEvent::ImportAccepted {
                    task_id: task_id.clone(),
                });
                self.watch(manager, task_id, events);
            }
        }
    }
}
