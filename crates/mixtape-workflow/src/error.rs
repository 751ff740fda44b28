//! Workflow error types.

use thiserror::Error;

use mixtape_client::ClientError;
use mixtape_models::{FileSetError, WizardStep};

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors surfaced by the workflow controller.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    FileSet(#[from] FileSetError),

    #[error("No files to generate from")]
    NoFiles,

    #[error("Cannot generate from the {step} step")]
    NotCollecting { step: WizardStep },

    #[error("No video to download")]
    NoArtifact,

    #[error("Service returned neither a description nor a video")]
    IncompleteResult,

    #[error("Generation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Transport(ClientError),
}

impl From<ClientError> for WorkflowError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NoArtifact => Self::NoArtifact,
            ClientError::EmptyFileSet => Self::NoFiles,
            ClientError::Cancelled => Self::Cancelled,
            other => Self::Transport(other),
        }
    }
}

impl WorkflowError {
    /// Local failures that leave every piece of state as it was.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::FileSet(_)
                | WorkflowError::NoFiles
                | WorkflowError::NotCollecting { .. }
                | WorkflowError::NoArtifact
        )
    }

    /// Warnings are shown but do not count as errors.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            WorkflowError::FileSet(FileSetError::NoValidFiles { .. })
        )
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::FileSet(FileSetError::NoValidFiles { .. }) => "no_valid_files",
            WorkflowError::FileSet(FileSetError::IndexOutOfRange { .. }) => "index_out_of_range",
            WorkflowError::FileSet(FileSetError::Unreadable { .. }) => "unreadable",
            WorkflowError::NoFiles => "no_files",
            WorkflowError::NotCollecting { .. } => "not_collecting",
            WorkflowError::NoArtifact => "no_artifact",
            WorkflowError::IncompleteResult => "incomplete_result",
            WorkflowError::Cancelled => "cancelled",
            WorkflowError::Transport(e) => e.kind(),
        }
    }

    /// The single message shown for this error.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::FileSet(e) => e.to_string(),
            WorkflowError::NoFiles => "Please upload at least one audio file".to_string(),
            WorkflowError::NotCollecting { .. } => {
                "Change the files or start over to generate again".to_string()
            }
            WorkflowError::NoArtifact => "No video to download".to_string(),
            WorkflowError::IncompleteResult => {
                "The service finished without returning a description or a video. Please try again."
                    .to_string()
            }
            WorkflowError::Cancelled => "Generation cancelled".to_string(),
            WorkflowError::Transport(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_workflow_variants() {
        assert!(matches!(
            WorkflowError::from(ClientError::NoArtifact),
            WorkflowError::NoArtifact
        ));
        assert!(matches!(
            WorkflowError::from(ClientError::EmptyFileSet),
            WorkflowError::NoFiles
        ));
        assert!(matches!(
            WorkflowError::from(ClientError::Cancelled),
            WorkflowError::Cancelled
        ));
        assert!(matches!(
            WorkflowError::from(ClientError::RequestTimeout),
            WorkflowError::Transport(ClientError::RequestTimeout)
        ));
    }

    #[test]
    fn test_user_message_passes_through_transport() {
        let err = WorkflowError::from(ClientError::from_http_status(413, None));
        assert_eq!(err.user_message(), "File size too large. Maximum 2GB per file.");
        assert_eq!(err.kind(), "payload_too_large");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_not_collecting_is_validation() {
        let err = WorkflowError::NotCollecting {
            step: WizardStep::Complete,
        };
        assert!(err.is_validation());
        assert!(!err.is_warning());
        assert_eq!(err.kind(), "not_collecting");
    }

    #[test]
    fn test_no_valid_files_is_warning() {
        let err = WorkflowError::from(FileSetError::NoValidFiles { rejected: 2 });
        assert!(err.is_warning());
        assert!(err.is_validation());

        let err = WorkflowError::from(FileSetError::IndexOutOfRange { index: 3, len: 1 });
        assert!(!err.is_warning());
        assert_eq!(err.kind(), "index_out_of_range");
    }
}
