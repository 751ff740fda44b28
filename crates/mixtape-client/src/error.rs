//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the generation service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No files to submit")]
    EmptyFileSet,

    #[error("No video artifact to download")]
    NoArtifact,

    #[error("Request timed out")]
    Timeout,

    #[error("Server timed out while processing the request")]
    RequestTimeout,

    #[error("Payload too large")]
    PayloadTooLarge { detail: Option<String> },

    #[error("Server error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    ServerError { status: u16, detail: Option<String> },

    #[error("Service unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(reqwest::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Self::ConnectionUnavailable(e.to_string())
        } else if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e)
        }
    }
}

impl ClientError {
    pub fn server_error(status: u16, detail: Option<String>) -> Self {
        Self::ServerError { status, detail }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-2xx status and its optional `detail` field.
    pub fn from_http_status(status: u16, detail: Option<String>) -> Self {
        match status {
            408 => Self::RequestTimeout,
            413 => Self::PayloadTooLarge { detail },
            _ => Self::ServerError { status, detail },
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::RequestTimeout => Some(408),
            ClientError::PayloadTooLarge { .. } => Some(413),
            ClientError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Local precondition failures that never reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::EmptyFileSet | ClientError::NoArtifact)
    }

    /// Failures of the exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout
                | ClientError::RequestTimeout
                | ClientError::PayloadTooLarge { .. }
                | ClientError::ServerError { .. }
                | ClientError::ConnectionUnavailable(_)
                | ClientError::Network(_)
        )
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::EmptyFileSet => "empty_file_set",
            ClientError::NoArtifact => "no_artifact",
            ClientError::Timeout => "timeout",
            ClientError::RequestTimeout => "request_timeout",
            ClientError::PayloadTooLarge { .. } => "payload_too_large",
            ClientError::ServerError { .. } => "server_error",
            ClientError::ConnectionUnavailable(_) => "connection_unavailable",
            ClientError::InvalidResponse(_) | ClientError::Json(_) => "invalid_response",
            ClientError::Cancelled => "cancelled",
            ClientError::Config(_) => "config",
            ClientError::Io(_) => "io",
            ClientError::Network(_) => "network",
        }
    }

    /// Cause-specific message for the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::EmptyFileSet => "Please upload at least one audio file".to_string(),
            ClientError::NoArtifact => "No video to download".to_string(),
            ClientError::Timeout => "Connection timeout - backend is not responding.".to_string(),
            ClientError::RequestTimeout => {
                "Request timeout - video processing took too long. Try with shorter audio files."
                    .to_string()
            }
            ClientError::PayloadTooLarge { .. } => {
                "File size too large. Maximum 2GB per file.".to_string()
            }
            ClientError::ServerError { status, detail } => {
                match detail.as_deref().filter(|d| !d.trim().is_empty()) {
                    Some(detail) => detail.to_string(),
                    None if *status == 500 => "Server error during video generation.".to_string(),
                    None => format!("Request failed with status code {}", status),
                }
            }
            ClientError::ConnectionUnavailable(_) => {
                "Backend is not running. Start the mixtape service and try again.".to_string()
            }
            ClientError::InvalidResponse(msg) => {
                format!("Unexpected response from backend: {}", msg)
            }
            ClientError::Json(e) => format!("Unexpected response from backend: {}", e),
            ClientError::Cancelled => "Generation cancelled".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_408() {
        let err = ClientError::from_http_status(408, None);
        assert!(matches!(err, ClientError::RequestTimeout));
        assert!(err.user_message().contains("took too long"));
    }

    #[test]
    fn test_from_http_status_413() {
        let err = ClientError::from_http_status(413, Some("too big".into()));
        assert!(matches!(err, ClientError::PayloadTooLarge { .. }));
        assert_eq!(err.http_status(), Some(413));
        assert!(err.user_message().contains("Maximum 2GB per file"));
    }

    #[test]
    fn test_server_error_prefers_detail() {
        let err = ClientError::from_http_status(
            500,
            Some("Error generating video: ffmpeg exited".into()),
        );
        assert_eq!(err.user_message(), "Error generating video: ffmpeg exited");

        let bare = ClientError::from_http_status(500, None);
        assert_eq!(bare.user_message(), "Server error during video generation.");
    }

    #[test]
    fn test_other_status_uses_detail_or_code() {
        let err = ClientError::from_http_status(400, Some("No files provided".into()));
        assert_eq!(err.user_message(), "No files provided");

        let err = ClientError::from_http_status(502, None);
        assert_eq!(err.user_message(), "Request failed with status code 502");
        assert_eq!(err.http_status(), Some(502));
    }

    #[test]
    fn test_classification() {
        assert!(ClientError::EmptyFileSet.is_validation());
        assert!(ClientError::NoArtifact.is_validation());
        assert!(!ClientError::EmptyFileSet.is_transport());

        assert!(ClientError::Timeout.is_transport());
        assert!(ClientError::ConnectionUnavailable("refused".into()).is_transport());
        assert!(!ClientError::InvalidResponse("{}".into()).is_transport());
        assert!(!ClientError::Cancelled.is_transport());
    }

    #[test]
    fn test_connection_message_is_distinct() {
        let err = ClientError::ConnectionUnavailable("connection refused".into());
        assert!(err.user_message().contains("Backend is not running"));
        assert_eq!(err.kind(), "connection_unavailable");
    }
}
