use serde::Deserialize;
use std::collections::HashMap;
use tower_api_client::Error as TransportError;

/// Coarse classification of a failed call, used by callers to decide how
/// loudly to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server understood the request and refused it (4xx).
    Rejection,
    /// The server failed while handling the request (5xx).
    Server,
    /// No response was received.
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        field_errors: HashMap<String, Vec<String>>,
    },
    #[error("Unable to connect to server")]
    Transport { detail: String },
}

impl ApiError {
    /// Build an error for a non-success status, using `body` for the message
    /// when the server sent one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let response: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let server_message = response.message.or(response.detail);
        let message = match status {
            400 => server_message.unwrap_or_else(|| "Invalid request data".to_string()),
            401 => "Authentication required".to_string(),
            403 => "Access denied".to_string(),
            404 => server_message.unwrap_or_else(|| "Resource not found".to_string()),
            422 => server_message.unwrap_or_else(|| "Validation error".to_string()),
            500 => "Server error, please try again later".to_string(),
            _ => server_message.unwrap_or_else(|| "An unexpected error occurred".to_string()),
        };
        Self::Status {
            status,
            message,
            field_errors: response.errors,
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { status, .. } if *status >= 500 => ErrorKind::Server,
            Self::Status { .. } => ErrorKind::Rejection,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::ClientError(status, body) | TransportError::ServerError(status, body) => {
                ApiError::from_status(status.as_u16(), &body)
            }
            e => ApiError::transport(e.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    detail: Option<String>,
    #[serde(default)]
    errors: HashMap<String, Vec<String>>,
}
