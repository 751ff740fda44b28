//! The generation wizard.
//!
//! [`WorkflowController`] owns the working file set and the wizard step,
//! drives one transport exchange per [`WorkflowController::generate`] call
//! and publishes a [`WorkflowSnapshot`] after every visible change.
//!
//! `generate` takes `&mut self`, so only one attempt can be in flight per
//! controller. Cancel it through the token from
//! [`WorkflowController::cancellation_token`], taken before the call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};

use mixtape_client::{progress_channel, ProgressReceiver, TransferEvent, Transport};
use mixtape_models::{
    AcceptOutcome, Advisory, AttemptId, AudioFile, GenerationOutcome, GenerationResult,
    HealthStatus, ProgressState, WizardStep, WorkingFileSet,
};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::estimator::{PlateauPolicy, ProgressEstimator};
use crate::logging::AttemptLogger;

/// Everything a presentation layer needs to render the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct WorkflowSnapshot {
    pub step: WizardStep,
    pub progress: ProgressState,
    pub is_loading: bool,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub description: Option<String>,
    pub video_path: Option<String>,
    pub file_count: usize,
    pub total_size_mb: f64,
    pub advisories: Vec<Advisory>,
}

/// Result of a liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Reachable(HealthStatus),
    Unavailable(String),
}

impl ServiceStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ServiceStatus::Reachable(_))
    }
}

pub struct WorkflowController {
    transport: Arc<dyn Transport>,
    config: WorkflowConfig,
    files: WorkingFileSet,
    step: WizardStep,
    description: Option<String>,
    video_path: Option<String>,
    error: Option<String>,
    warning: Option<String>,
    is_loading: bool,
    estimator: ProgressEstimator,
    cancel: CancellationToken,
    updates: watch::Sender<WorkflowSnapshot>,
}

impl WorkflowController {
    pub fn new(transport: Arc<dyn Transport>, config: WorkflowConfig) -> Self {
        let estimator =
            ProgressEstimator::new(PlateauPolicy::with_settle_delay(config.settle_delay));
        let (updates, _) = watch::channel(WorkflowSnapshot::default());

        Self {
            transport,
            config,
            files: WorkingFileSet::new(),
            step: WizardStep::Collecting,
            description: None,
            video_path: None,
            error: None,
            warning: None,
            is_loading: false,
            estimator,
            cancel: CancellationToken::new(),
            updates,
        }
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            step: self.step,
            progress: self.estimator.state(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            warning: self.warning.clone(),
            description: self.description.clone(),
            video_path: self.video_path.clone(),
            file_count: self.files.len(),
            total_size_mb: self.files.aggregate_size_mb(),
            advisories: self.files.advisories(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn files(&self) -> &WorkingFileSet {
        &self.files
    }

    pub fn progress(&self) -> ProgressState {
        self.estimator.state()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Token that cancels the next (or current) attempt.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Append the audio candidates. Non-audio candidates are skipped; if none
    /// is audio the set is left unchanged and a warning is shown.
    pub fn add_files<I>(&mut self, candidates: I) -> WorkflowResult<AcceptOutcome>
    where
        I: IntoIterator<Item = AudioFile>,
    {
        match self.files.accept(candidates) {
            Ok(outcome) => {
                self.warning = (outcome.rejected > 0)
                    .then(|| format!("Skipped {} non-audio file(s)", outcome.rejected));
                for advisory in self.files.advisories() {
                    warn!(advisory = %advisory, "File set outside recommended limits");
                }
                info!(
                    accepted = outcome.accepted,
                    rejected = outcome.rejected,
                    files = self.files.len(),
                    "Files added"
                );
                self.files_changed();
                Ok(outcome)
            }
            Err(e) => {
                let err = WorkflowError::from(e);
                self.warning = Some(err.user_message());
                self.publish();
                Err(err)
            }
        }
    }

    /// Remove the file at `index`.
    pub fn remove_file(&mut self, index: usize) -> WorkflowResult<AudioFile> {
        match self.files.remove(index) {
            Ok(removed) => {
                info!(file = %removed.name, files = self.files.len(), "File removed");
                self.warning = None;
                self.files_changed();
                Ok(removed)
            }
            Err(e) => {
                let err = WorkflowError::from(e);
                self.error = Some(err.user_message());
                self.publish();
                Err(err)
            }
        }
    }

    /// Empty the wizard: no files, no results, no messages.
    pub fn reset(&mut self) {
        self.files.clear();
        self.step = WizardStep::Collecting;
        self.description = None;
        self.video_path = None;
        self.error = None;
        self.warning = None;
        self.is_loading = false;
        self.estimator.reset();
        self.publish();
    }

    /// Run one generation attempt and return the step it landed on.
    ///
    /// Only valid on `Collecting`. A held result is discarded by changing the
    /// file set or calling [`WorkflowController::reset`], not by generating
    /// again. On any failure the wizard is back on `Collecting` with the file
    /// set untouched and the error's message shown. Returns after the
    /// progress indicator has been hidden.
    pub async fn generate(&mut self) -> WorkflowResult<WizardStep> {
        if self.step != WizardStep::Collecting {
            let err = WorkflowError::NotCollecting { step: self.step };
            self.error = Some(err.user_message());
            self.publish();
            return Err(err);
        }

        if self.files.is_empty() {
            let err = WorkflowError::NoFiles;
            self.error = Some(err.user_message());
            self.publish();
            return Err(err);
        }

        let attempt_id = AttemptId::new();
        let logger = AttemptLogger::new(&attempt_id, "generate");
        let span = logger.create_span();

        self.run_attempt(&logger).instrument(span).await
    }

    async fn run_attempt(&mut self, logger: &AttemptLogger) -> WorkflowResult<WizardStep> {
        let files = self.files.snapshot();
        let cancel = self.cancel.clone();

        for advisory in self.files.advisories() {
            logger.log_warning(&advisory.to_string());
        }
        logger.log_start(&format!(
            "{} file(s), {:.1} MB",
            files.len(),
            self.files.aggregate_size_mb()
        ));

        self.step = WizardStep::Generating;
        self.is_loading = true;
        self.error = None;
        self.warning = None;
        self.description = None;
        self.video_path = None;
        self.estimator.begin(Instant::now());
        self.publish();

        let result = self
            .exchange(files, &cancel, logger)
            .await
            .and_then(|result| result.outcome().ok_or(WorkflowError::IncompleteResult));

        // A token is good for one attempt
        self.cancel = CancellationToken::new();

        match result {
            Ok(outcome) => {
                self.estimator.complete();
                self.step = match outcome {
                    GenerationOutcome::Described { description } => {
                        self.description = Some(description);
                        WizardStep::Reviewing
                    }
                    GenerationOutcome::Rendered {
                        video_path,
                        description,
                    } => {
                        self.description = description;
                        self.video_path = Some(video_path);
                        WizardStep::Complete
                    }
                };
                self.publish();
                logger.log_completion(&format!("landed on {}", self.step));

                tokio::time::sleep(self.config.cooldown).await;
                self.estimator.hide();
                self.is_loading = false;
                self.publish();

                Ok(self.step)
            }
            Err(err) => {
                self.estimator.fail();
                self.step = WizardStep::Collecting;
                self.is_loading = false;
                self.error = Some(err.user_message());
                self.publish();
                logger.log_failure(err.kind(), &err.to_string());

                tokio::time::sleep(self.config.cooldown).await;
                self.estimator.hide();
                self.publish();

                Err(err)
            }
        }
    }

    /// Settle, then race the submission against cancellation while applying
    /// progress events as they arrive.
    async fn exchange(
        &mut self,
        files: Arc<Vec<AudioFile>>,
        cancel: &CancellationToken,
        logger: &AttemptLogger,
    ) -> WorkflowResult<GenerationResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(WorkflowError::Cancelled),
            _ = tokio::time::sleep(self.config.settle_delay) => {}
        }
        self.estimator.tick(Instant::now());
        self.publish();

        let transport = Arc::clone(&self.transport);
        let (sender, mut events) = progress_channel();
        let submit = transport.submit(files, sender);
        tokio::pin!(submit);

        let result = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WorkflowError::Cancelled),
                Some(event) = events.recv() => self.apply(event, logger),
                result = &mut submit => break result,
            }
        };

        // Events still queued when the response resolved belong before completion
        self.drain(&mut events, cancel, logger)?;

        result.map_err(WorkflowError::from)
    }

    fn drain(
        &mut self,
        events: &mut ProgressReceiver,
        cancel: &CancellationToken,
        logger: &AttemptLogger,
    ) -> WorkflowResult<()> {
        while let Some(event) = events.try_recv() {
            if cancel.is_cancelled() {
                return Err(WorkflowError::Cancelled);
            }
            self.apply(event, logger);
        }
        Ok(())
    }

    fn apply(&mut self, event: TransferEvent, logger: &AttemptLogger) {
        let before = self.estimator.state();
        let after = self.estimator.observe(event, Instant::now());
        if after.phase != before.phase {
            logger.log_progress(&format!("{} at {}%", after.phase, after.percent));
        }
        if after != before {
            self.publish();
        }
    }

    /// Save the held video under the configured output directory.
    pub async fn download(&mut self) -> WorkflowResult<PathBuf> {
        let dest_dir = self.config.output_dir.clone();
        self.download_to(&dest_dir).await
    }

    /// Save the held video under `dest_dir`. The wizard step does not change.
    pub async fn download_to(&mut self, dest_dir: &Path) -> WorkflowResult<PathBuf> {
        let Some(video_path) = self.video_path.clone() else {
            let err = WorkflowError::NoArtifact;
            self.error = Some(err.user_message());
            self.publish();
            return Err(err);
        };

        let logger = AttemptLogger::new(&AttemptId::new(), "download");
        logger.log_start(&video_path);

        match self
            .transport
            .retrieve(&video_path, dest_dir)
            .instrument(logger.create_span())
            .await
        {
            Ok(saved) => {
                logger.log_completion(&saved.display().to_string());
                Ok(saved)
            }
            Err(e) => {
                let err = WorkflowError::from(e);
                logger.log_failure(err.kind(), &err.to_string());
                self.error = Some(format!("Download error: {}", err.user_message()));
                self.publish();
                Err(err)
            }
        }
    }

    /// Probe the service. Failures are reported, never raised.
    pub async fn check_service(&self) -> ServiceStatus {
        match self.transport.health().await {
            Ok(health) => ServiceStatus::Reachable(health),
            Err(e) => {
                warn!(error = %e, "Service unavailable");
                ServiceStatus::Unavailable(e.user_message())
            }
        }
    }

    fn files_changed(&mut self) {
        self.step = WizardStep::Collecting;
        self.description = None;
        self.video_path = None;
        self.error = None;
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }
}
