//! Media Mover - inbox watcher for photo and video organization
//!
//! Watches a source directory and moves each arriving photo or video
//! into an organized destination tree named from its capture timestamp.

use anyhow::{Context, Result, bail};
use clap::Parser;
use media_mover::external::{PROBER, TRANSCODER};
use media_mover::{Cli, Config, InboxWatcher, Sequencer, external};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => cli.merge_with_config(
            Config::load_from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
        ),
        None => cli.to_config(),
    };
    let config = config.expand_home();
    config.validate()?;

    let _guard = setup_logging(&config)?;
    info!("Application started");

    run(config)?;

    info!("Application ending by request from user");
    Ok(())
}

fn run(config: Config) -> Result<()> {
    // fail fast before watching begins
    for binary in [TRANSCODER, PROBER] {
        external::require_binary(binary)?;
    }
    if !config.source_dir.is_dir() {
        bail!("Source directory {} not found", config.source_dir.display());
    }
    if !config.dest_dir.is_dir() {
        bail!(
            "Destination directory {} not found",
            config.dest_dir.display()
        );
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .context("installing interrupt handler")?;
    }

    let (sender, receiver) = mpsc::channel();
    let _watcher = InboxWatcher::start(&config.source_dir, sender)
        .with_context(|| format!("watching {}", config.source_dir.display()))?;

    Sequencer::new(config).run(receiver, shutdown);

    Ok(())
}

/// Log to the configured file (non-blocking) and to stderr
fn setup_logging(config: &Config) -> Result<WorkerGuard> {
    let level: tracing::Level = config
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log_level '{}'", config.log_level))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}
