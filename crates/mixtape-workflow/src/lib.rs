//! Generation workflow for the Mixtape client.
//!
//! This crate provides:
//! - The four-step wizard controller and its published snapshots
//! - Progress estimation across upload, processing and download
//! - Workflow configuration, attempt logging and persisted preferences

pub mod config;
pub mod controller;
pub mod error;
pub mod estimator;
pub mod logging;
pub mod preferences;

pub use config::WorkflowConfig;
pub use controller::{ServiceStatus, WorkflowController, WorkflowSnapshot};
pub use error::{WorkflowError, WorkflowResult};
pub use estimator::{plateau, PhaseWindow, PlateauPolicy, ProgressEstimator};
pub use logging::AttemptLogger;
pub use preferences::{DisplayPreferences, PreferenceError, PreferenceStore};
