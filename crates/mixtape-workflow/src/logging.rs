//! Structured attempt logging and counters.
//!
//! Gives every generation attempt a consistent field set and span, and
//! records attempt outcomes through the `metrics` facade. No recorder is
//! installed here; counters are dropped unless the host installs one.

use metrics::counter;
use tracing::{error, info, warn, Span};

use mixtape_models::AttemptId;

/// Metric names as constants for consistency.
pub mod names {
    pub const ATTEMPTS_STARTED_TOTAL: &str = "mixtape_attempts_started_total";
    pub const ATTEMPTS_SUCCEEDED_TOTAL: &str = "mixtape_attempts_succeeded_total";
    pub const ATTEMPTS_FAILED_TOTAL: &str = "mixtape_attempts_failed_total";
}

/// Logger for one generation attempt.
#[derive(Debug, Clone)]
pub struct AttemptLogger {
    attempt_id: String,
    operation: String,
}

impl AttemptLogger {
    /// # Arguments
    /// * `attempt_id` - The attempt being logged
    /// * `operation` - What the attempt does (e.g. "generate", "download")
    pub fn new(attempt_id: &AttemptId, operation: &str) -> Self {
        Self {
            attempt_id: attempt_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        counter!(names::ATTEMPTS_STARTED_TOTAL, "operation" => self.operation.clone())
            .increment(1);
        info!(
            attempt_id = %self.attempt_id,
            operation = %self.operation,
            "Attempt started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            attempt_id = %self.attempt_id,
            operation = %self.operation,
            "Attempt progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            attempt_id = %self.attempt_id,
            operation = %self.operation,
            "Attempt warning: {}", message
        );
    }

    /// Log a failed attempt and count it under `kind`.
    pub fn log_failure(&self, kind: &'static str, message: &str) {
        counter!(
            names::ATTEMPTS_FAILED_TOTAL,
            "operation" => self.operation.clone(),
            "kind" => kind
        )
        .increment(1);
        error!(
            attempt_id = %self.attempt_id,
            operation = %self.operation,
            kind,
            "Attempt failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        counter!(names::ATTEMPTS_SUCCEEDED_TOTAL, "operation" => self.operation.clone())
            .increment(1);
        info!(
            attempt_id = %self.attempt_id,
            operation = %self.operation,
            "Attempt completed: {}", message
        );
    }

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the attempt fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "attempt",
            attempt_id = %self.attempt_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_logger_creation() {
        let attempt_id = AttemptId::new();
        let logger = AttemptLogger::new(&attempt_id, "generate");

        assert_eq!(logger.attempt_id(), attempt_id.to_string());
        assert_eq!(logger.operation(), "generate");
    }

    #[test]
    fn test_logging_without_recorder() {
        let logger = AttemptLogger::new(&AttemptId::new(), "generate");
        logger.log_start("2 files");
        logger.log_progress("processing at 30%");
        logger.log_failure("timeout", "no response");
        logger.log_completion("done");
    }
}
