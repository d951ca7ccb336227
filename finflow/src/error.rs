use finflow_api::{ApiError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The remote call failed; any optimistic change has already been undone.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl StoreError {
    pub(crate) fn remote(source: ApiError, verb: &str, noun: &str) -> Self {
        let message = source.to_string();
        let message = if message.trim().is_empty() {
            format!("Failed to {} {}", verb, noun)
        } else {
            message
        };
        Self::Remote { message, source }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Remote { message, .. } => message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote { source, .. } => source.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_kept() {
        let err = StoreError::remote(ApiError::status(400, "Delete failed"), "delete", "transaction");
        assert_eq!(err.to_string(), "Delete failed");
        assert_eq!(err.kind(), ErrorKind::Rejection);
    }

    #[test]
    fn test_blank_message_falls_back_to_operation() {
        let err = StoreError::remote(ApiError::status(422, ""), "create", "budget");
        assert_eq!(err.message(), "Failed to create budget");
    }
}
