use crate::import::ImportSummary;

/// Results delivered from background tasks to whoever is watching
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    /// The server queued the import as a background job
    ImportAccepted { task_id: String },
    /// Terminal result, either immediate (`task_id` is `None`) or polled
    ImportFinished {
        task_id: Option<String>,
        summary: ImportSummary,
    },
    /// Polling gave up; the outcome is unknown, not failed
    ImportTimedOut { task_id: String },
    ImportCancelled { task_id: String },
}
