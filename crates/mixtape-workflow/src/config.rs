//! Workflow configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::estimator::{COOLDOWN, SETTLE_DELAY};

/// Workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Delay before the settle value is shown
    pub settle_delay: Duration,
    /// Delay after resolution before the indicator is hidden
    pub cooldown: Duration,
    /// Where downloaded videos are saved
    pub output_dir: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            cooldown: COOLDOWN,
            output_dir: PathBuf::from("."),
        }
    }
}

impl WorkflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            settle_delay: Duration::from_millis(
                std::env::var("MIXTAPE_SETTLE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            cooldown: Duration::from_millis(
                std::env::var("MIXTAPE_COOLDOWN_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            output_dir: std::env::var("MIXTAPE_OUTPUT_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("MIXTAPE_SETTLE_DELAY_MS");
        std::env::remove_var("MIXTAPE_COOLDOWN_MS");
        std::env::remove_var("MIXTAPE_OUTPUT_DIR");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = WorkflowConfig::from_env();
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.cooldown, Duration::from_secs(2));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("MIXTAPE_SETTLE_DELAY_MS", "50");
        std::env::set_var("MIXTAPE_COOLDOWN_MS", "-1");
        std::env::set_var("MIXTAPE_OUTPUT_DIR", "/tmp/mixtapes");
        let config = WorkflowConfig::from_env();
        assert_eq!(config.settle_delay, Duration::from_millis(50));
        assert_eq!(config.cooldown, Duration::from_secs(2));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/mixtapes"));
        clear_env();
    }
}
