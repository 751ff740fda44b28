//! Command-line front end for the Mixtape service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mixtape_client::{ClientConfig, MixtapeClient};
use mixtape_models::{AudioFile, WizardStep};
use mixtape_workflow::{
    DisplayPreferences, PreferenceStore, ServiceStatus, WorkflowConfig, WorkflowController,
};

/// Turn a set of audio files into a mixtape video and description
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(version)]
struct Args {
    /// Service base URL (overrides MIXTAPE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload audio files and generate a mixtape
    Generate {
        /// Audio files, in track order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory the video is saved to (overrides MIXTAPE_OUTPUT_DIR)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not download the video
        #[arg(long)]
        no_download: bool,
    },
    /// Check that the service is reachable
    Health,
    /// Show or set the display theme
    Theme {
        mode: Option<ThemeMode>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeMode {
    Dark,
    Light,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let args = Args::parse();

    match args.command {
        Command::Generate {
            files,
            out,
            no_download,
        } => generate(args.api_url, files, out, no_download).await,
        Command::Health => health(args.api_url).await,
        Command::Theme { mode } => theme(mode),
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("mixtape=info".parse()?)
        .add_directive("mixtape_workflow=info".parse()?)
        .add_directive("mixtape_client=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

fn controller(api_url: Option<String>, out: Option<PathBuf>) -> Result<WorkflowController> {
    let client_config = match api_url {
        Some(url) => {
            let config = ClientConfig {
                base_url: url.trim_end_matches('/').to_string(),
                ..ClientConfig::from_env()?
            };
            config.validate()?;
            config
        }
        None => ClientConfig::from_env()?,
    };

    let mut workflow_config = WorkflowConfig::from_env();
    if let Some(out) = out {
        workflow_config.output_dir = out;
    }

    info!(base_url = %client_config.base_url, "Using service");
    let client = MixtapeClient::new(client_config).context("failed to create client")?;
    Ok(WorkflowController::new(Arc::new(client), workflow_config))
}

async fn generate(
    api_url: Option<String>,
    paths: Vec<PathBuf>,
    out: Option<PathBuf>,
    no_download: bool,
) -> Result<()> {
    let mut controller = controller(api_url, out)?;

    let mut candidates = Vec::with_capacity(paths.len());
    for path in &paths {
        match AudioFile::from_path(path) {
            Ok(file) => candidates.push(file),
            Err(e) => warn!(error = %e, "Skipping file"),
        }
    }

    let outcome = controller
        .add_files(candidates)
        .map_err(|e| anyhow!(e.user_message()))?;
    if let Some(warning) = controller.warning() {
        warn!("{}", warning);
    }
    info!(
        files = outcome.accepted,
        size_mb = %format!("{:.1}", controller.files().aggregate_size_mb()),
        "Ready to generate"
    );

    let token = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling");
            token.cancel();
        }
    });

    let mut updates = controller.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            let current = (snapshot.step, snapshot.progress.percent, snapshot.progress.phase);
            if snapshot.progress.visible && last != Some(current) {
                info!(
                    step = snapshot.step.number(),
                    phase = %snapshot.progress.phase,
                    percent = snapshot.progress.percent,
                    "Progress"
                );
                last = Some(current);
            }
        }
    });

    let result = controller.generate().await;
    let step = match result {
        Ok(step) => step,
        Err(e) => {
            reporter.abort();
            bail!(e.user_message());
        }
    };

    if let Some(description) = controller.description() {
        println!("{}", description);
    }

    if step == WizardStep::Complete && !no_download {
        let saved = controller
            .download()
            .await
            .map_err(|e| anyhow!("Download error: {}", e.user_message()))?;
        println!("Saved {}", saved.display());
    } else if let Some(video_path) = controller.video_path() {
        println!("Video available at {}", video_path);
    }

    drop(controller);
    reporter.await.ok();
    Ok(())
}

async fn health(api_url: Option<String>) -> Result<()> {
    let controller = controller(api_url, None)?;

    match controller.check_service().await {
        ServiceStatus::Reachable(health) => {
            let status = health.status.as_deref().unwrap_or("ok");
            match health.message {
                Some(message) => println!("{}: {}", status, message),
                None => println!("{}", status),
            }
            Ok(())
        }
        ServiceStatus::Unavailable(message) => bail!(message),
    }
}

fn theme(mode: Option<ThemeMode>) -> Result<()> {
    let store = PreferenceStore::open_default()?;

    match mode {
        None => {
            let prefs = store.load();
            println!("{}", if prefs.dark_mode { "dark" } else { "light" });
        }
        Some(mode) => {
            let prefs = DisplayPreferences {
                dark_mode: matches!(mode, ThemeMode::Dark),
            };
            store
                .save(&prefs)
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            info!(path = %store.path().display(), dark_mode = prefs.dark_mode, "Theme saved");
        }
    }

    Ok(())
}
