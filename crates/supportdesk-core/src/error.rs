//! Error types for the gateway and the surfaces built on it.

use reqwest::StatusCode;

/// Broad failure category, used by views to pick their fallback copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Http,
    Network,
    Parse,
    Input,
}

/// Errors from calls to the question-answering backend.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("request interrupted: {0}")]
    Interrupted(String),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Status { .. } => ErrorKind::Http,
            GatewayError::Network(_) | GatewayError::Interrupted(_) => ErrorKind::Network,
            GatewayError::Decode(_) => ErrorKind::Parse,
            GatewayError::EmptyQuery | GatewayError::Io { .. } => ErrorKind::Input,
        }
    }

    /// HTTP status when the backend answered with a non-2xx
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors from the chat transcript.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("a request is already in flight")]
    Busy,
    #[error("message not found: {0}")]
    MessageNotFound(String),
    #[error("feedback only applies to assistant messages")]
    NotAnAssistantMessage,
}

/// Errors from the agent-assist panel.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("a suggestion is already being generated")]
    Busy,
    #[error("no suggestion to insert")]
    NothingToInsert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_and_kind() {
        let err = GatewayError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error: boom");
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_input_errors() {
        assert_eq!(GatewayError::EmptyQuery.kind(), ErrorKind::Input);
        assert_eq!(GatewayError::EmptyQuery.status(), None);

        let err = GatewayError::Io {
            path: "missing.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_interrupted_counts_as_network() {
        let err = GatewayError::Interrupted("task panicked".to_string());
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_decode_kind() {
        let err = GatewayError::Decode("expected value".to_string());
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "could not decode response: expected value");
    }

    #[test]
    fn test_surface_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(ChatError::Busy.to_string(), "a request is already in flight");
        assert_eq!(
            ChatError::MessageNotFound("m-1".to_string()).to_string(),
            "message not found: m-1"
        );
        assert_eq!(
            AssistError::Busy.to_string(),
            "a suggestion is already being generated"
        );
    }
}
