//! Progress estimation across the three phases of an attempt.
//!
//! Only the upload and the response download report real byte counts. The
//! server-side processing in between is silent, so its contribution is a
//! fixed plateau rather than an invented ramp.
//!
//! Phase windows:
//! - Uploading: [`UPLOAD_WINDOW`] (0..=30)
//! - Processing: [`PROCESSING_WINDOW`] (30..=90)
//! - Downloading: [`DOWNLOAD_WINDOW`] (90..=100)
//!
//! Every value shown before resolution is capped at [`PRE_COMPLETION_CAP`]
//! and never decreases.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use mixtape_client::TransferEvent;
use mixtape_models::{Phase, ProgressState};

/// Highest value shown before the result arrives.
pub const PRE_COMPLETION_CAP: u8 = 95;

/// Value the display is raised to once the attempt has settled.
pub const SETTLE_PERCENT: u8 = 10;

/// Delay from attempt start before the settle value applies.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Delay after resolution before the indicator is hidden.
pub const COOLDOWN: Duration = Duration::from_secs(2);

pub const UPLOAD_WINDOW: PhaseWindow = PhaseWindow::new(0, 30);
pub const PROCESSING_WINDOW: PhaseWindow = PhaseWindow::new(30, 90);
pub const DOWNLOAD_WINDOW: PhaseWindow = PhaseWindow::new(90, 100);

/// A closed percentage range a phase maps its ratio into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindow {
    pub start: u8,
    pub end: u8,
}

impl PhaseWindow {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Map `loaded / total` into the window. `None` when `total` is zero.
    pub fn map(&self, loaded: u64, total: u64) -> Option<u8> {
        if total == 0 {
            return None;
        }
        let ratio = (loaded as f64 / total as f64).clamp(0.0, 1.0);
        let span = f64::from(self.end - self.start);
        Some(self.start + (ratio * span).floor() as u8)
    }
}

/// Floor values that do not depend on any transfer telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauPolicy {
    pub settle_delay: Duration,
    pub settle_percent: u8,
}

impl Default for PlateauPolicy {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            settle_percent: SETTLE_PERCENT,
        }
    }
}

impl PlateauPolicy {
    pub fn with_settle_delay(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            ..Default::default()
        }
    }

    /// Minimum value for `phase` at `elapsed` since the attempt started.
    pub fn floor(&self, phase: Phase, elapsed: Duration) -> u8 {
        let settled = if elapsed >= self.settle_delay {
            self.settle_percent
        } else {
            0
        };

        match phase {
            Phase::Idle => 0,
            Phase::Uploading => settled,
            Phase::Processing => PROCESSING_WINDOW.start.max(settled),
            Phase::Downloading => DOWNLOAD_WINDOW.start,
            Phase::Done => 100,
        }
    }
}

/// [`PlateauPolicy::floor`] with the default constants.
pub fn plateau(phase: Phase, elapsed: Duration) -> u8 {
    PlateauPolicy::default().floor(phase, elapsed)
}

/// Turns raw transfer events and elapsed time into one displayed value.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    policy: PlateauPolicy,
    state: ProgressState,
    started_at: Option<Instant>,
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new(PlateauPolicy::default())
    }
}

impl ProgressEstimator {
    pub fn new(policy: PlateauPolicy) -> Self {
        Self {
            policy,
            state: ProgressState::default(),
            started_at: None,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn policy(&self) -> PlateauPolicy {
        self.policy
    }

    /// Start a new attempt: value 0, phase Uploading, visible.
    pub fn begin(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.state = ProgressState {
            percent: 0,
            phase: Phase::Uploading,
            visible: true,
        };
    }

    /// Apply the time-based floor for the current phase.
    pub fn tick(&mut self, now: Instant) -> ProgressState {
        if let Some(started_at) = self.started_at {
            if self.state.phase.is_in_flight() {
                let floor = self.policy.floor(self.state.phase, now - started_at);
                self.raise(floor);
            }
        }
        self.state
    }

    /// Apply one transfer event.
    pub fn observe(&mut self, event: TransferEvent, now: Instant) -> ProgressState {
        if !self.state.phase.is_in_flight() {
            return self.state;
        }

        match event {
            TransferEvent::Upload { loaded, total } => {
                if self.state.phase != Phase::Uploading {
                    return self.state;
                }
                if let Some(value) = UPLOAD_WINDOW.map(loaded, total) {
                    self.raise(value);
                    if loaded >= total {
                        self.enter(Phase::Processing);
                    }
                }
            }
            TransferEvent::Download { loaded, total } => {
                if self.state.phase != Phase::Downloading {
                    self.enter(Phase::Downloading);
                }
                if let Some(value) = DOWNLOAD_WINDOW.map(loaded, total) {
                    self.raise(value);
                }
            }
        }

        self.tick(now)
    }

    /// Result received: exactly 100, phase Done.
    pub fn complete(&mut self) -> ProgressState {
        self.started_at = None;
        self.state.percent = 100;
        self.state.phase = Phase::Done;
        self.state
    }

    /// Attempt failed: back to 0 and Idle. Visibility is cleared separately
    /// after the cool-down.
    pub fn fail(&mut self) -> ProgressState {
        self.started_at = None;
        self.state.percent = 0;
        self.state.phase = Phase::Idle;
        self.state
    }

    pub fn hide(&mut self) -> ProgressState {
        self.state.visible = false;
        self.state
    }

    /// Back to the initial state, hidden.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.state = ProgressState::default();
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.state.phase, to = %phase, percent = self.state.percent, "Progress phase change");
        self.state.phase = phase;
        let floor = match phase {
            Phase::Processing => PROCESSING_WINDOW.start,
            Phase::Downloading => DOWNLOAD_WINDOW.start,
            _ => 0,
        };
        self.raise(floor);
    }

    fn raise(&mut self, candidate: u8) {
        let capped = candidate.min(PRE_COMPLETION_CAP);
        self.state.percent = self.state.percent.max(capped);
    }
}
