//! Wizard steps of the generation workflow.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four ordered steps a user moves through.
///
/// `Generating` is transient. From it the workflow lands on `Reviewing`
/// (description only), `Complete` (video produced) or back on `Collecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Selecting and arranging audio files
    #[default]
    Collecting,
    /// A generation attempt is in flight
    Generating,
    /// A description came back without a video
    Reviewing,
    /// A video is ready to download
    Complete,
}

impl WizardStep {
    /// Step number shown to the user (1-4).
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Collecting => 1,
            WizardStep::Generating => 2,
            WizardStep::Reviewing => 3,
            WizardStep::Complete => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Collecting => "collecting",
            WizardStep::Generating => "generating",
            WizardStep::Reviewing => "reviewing",
            WizardStep::Complete => "complete",
        }
    }

    /// Whether the step holds a generated result.
    pub fn has_result(&self) -> bool {
        matches!(self, WizardStep::Reviewing | WizardStep::Complete)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_ordered() {
        let steps = [
            WizardStep::Collecting,
            WizardStep::Generating,
            WizardStep::Reviewing,
            WizardStep::Complete,
        ];
        let numbers: Vec<u8> = steps.iter().map(WizardStep::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_has_result() {
        assert!(!WizardStep::Collecting.has_result());
        assert!(!WizardStep::Generating.has_result());
        assert!(WizardStep::Reviewing.has_result());
        assert!(WizardStep::Complete.has_result());
    }
}
