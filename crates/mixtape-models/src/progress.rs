//! Displayed progress of a generation attempt.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contiguous segment of one attempt's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No attempt running
    #[default]
    Idle,
    /// Request body is being sent
    Uploading,
    /// Server is working; no telemetry
    Processing,
    /// Response body is being received
    Downloading,
    /// Result received
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Processing => "processing",
            Phase::Downloading => "downloading",
            Phase::Done => "done",
        }
    }

    /// Whether an attempt is between start and resolution.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Phase::Uploading | Phase::Processing | Phase::Downloading
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the progress indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ProgressState {
    /// Percentage (0-100)
    pub percent: u8,
    /// Current phase
    pub phase: Phase,
    /// Whether the indicator is on screen
    pub visible: bool,
}

impl ProgressState {
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done && self.percent == 100
    }
}
