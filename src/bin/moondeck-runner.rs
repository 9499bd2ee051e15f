//! MoonDeck runner - launches a Steam game on a GameStream host
//!
//! Started by the MoonDeck front-end with the app id in
//! `MOONDECK_STEAM_APP_ID`. Streams Steam through Moonlight, launches the
//! app through Buddy, waits for it to close and writes the outcome to the
//! result file.
//!
//! # Usage
//!
//! ```text
//! MOONDECK_STEAM_APP_ID=570 moondeck-runner
//! moondeck-runner --settings ./settings.json --result ./runner_result.json
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use moondeck_runner::collab::{FileResultSink, JsonSettingsStore};
use moondeck_runner::{DefaultSessionFactory, RunnerConfig, TopLevelRunner, APP_ID_ENV};

const APP_DIR: &str = "moondeck";

// ============================================================================
// CLI Arguments
// ============================================================================

/// MoonDeck runner - launch and track a Steam game over GameStream
#[derive(Parser, Debug)]
#[command(name = "moondeck-runner")]
#[command(about = "Launch a Steam game on a GameStream host and track it until it closes")]
#[command(version)]
struct Args {
    /// User settings written by the front-end
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Where to write the run result
    #[arg(long)]
    result: Option<PathBuf>,

    /// Optional runner configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (appended to)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

// ============================================================================
// Logging
// ============================================================================

fn create_log_file(path: &Path) -> Option<fs::File> {
    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Warning: Failed to create log directory {dir:?}: {e}");
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {path:?}: {e}");
            None
        }
    }
}

fn setup_logging(log_path: &Path) {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["moondeck=info", "moondeck_runner=info"] {
        filter = filter.add_directive(
            directive
                .parse()
                .unwrap_or_else(|_| Directive::from(tracing::Level::INFO)),
        );
    }

    match create_log_file(log_path) {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

// ============================================================================
// Signals
// ============================================================================

async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args
        .log_file
        .unwrap_or_else(|| state_dir().join("runner.log"));
    setup_logging(&log_file);

    let config_path = args
        .config
        .unwrap_or_else(|| config_dir().join("runner.toml"));
    let settings_path = args
        .settings
        .unwrap_or_else(|| config_dir().join("settings.json"));
    let result_path = args
        .result
        .unwrap_or_else(|| state_dir().join("runner_result.json"));

    info!(
        settings = %settings_path.display(),
        result = %result_path.display(),
        "MoonDeck runner starting"
    );

    let config = RunnerConfig::load(&config_path).context("Failed to load runner config")?;

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
            return;
        }
        shutdown_token.cancel();
    });

    let runner = TopLevelRunner::new(
        Box::new(JsonSettingsStore::new(settings_path)),
        Box::new(FileResultSink::new(result_path)),
        Box::new(DefaultSessionFactory::new(config, cancel_token)),
    );

    let app_id = std::env::var(APP_ID_ENV).ok();
    let result = runner.run(app_id.as_deref()).await?;

    info!(result = ?result, "MoonDeck runner exiting");
    Ok(())
}
