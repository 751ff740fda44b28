//! Shared data models for the Mixtape client.
//!
//! This crate provides Serde-serializable types for:
//! - Audio inputs and the ordered working file set
//! - Wizard steps of the generation workflow
//! - Progress phases and the displayed progress state
//! - Generation results and health responses from the remote service

pub mod attempt;
pub mod audio;
pub mod file_set;
pub mod generation;
pub mod progress;
pub mod wizard;

// Re-export common types
pub use attempt::AttemptId;
pub use audio::{AudioFile, AUDIO_MIME_PREFIX};
pub use file_set::{
    AcceptOutcome, Advisory, FileSetError, FileSetResult, WorkingFileSet,
    MAX_RECOMMENDED_FILES, MAX_RECOMMENDED_FILE_BYTES, MIN_RECOMMENDED_FILES,
};
pub use generation::{GenerationOutcome, GenerationResult, HealthStatus};
pub use progress::{Phase, ProgressState};
pub use wizard::WizardStep;
