//! CLI entry point for the hegre downloader.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hegre_core::{
    Archive, ConsoleProgress, HegreParser, Orchestrator, ProgressSink, RetryPolicy, SessionClient,
    SessionPreferences, SilentProgress, convert_size, load_file_config,
};
use tracing::{debug, error, info};

mod cli;
mod exit_handler;

use cli::Args;
use exit_handler::{ProcessExit, determine_exit_outcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("Error: {e:#}");
            ProcessExit::Failure.into()
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info)
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ProcessExit> {
    let file_config = load_file_config(args.config.as_deref())?;
    let config = args.configuration(file_config.as_ref());
    config.validate()?;
    debug!(?config, "configuration resolved");

    let (Some(username), Some(password)) = (args.username.as_deref(), args.password.as_deref())
    else {
        bail!("Please provide username and password (--username/--password or HEGRE_USERNAME/HEGRE_PASSWORD)");
    };

    let archive = match config.archive.as_deref() {
        Some(path) => Archive::load(path).await?,
        None => Archive::in_memory(),
    };
    debug!(entries = archive.len().await, "archive loaded");

    let preferences = SessionPreferences {
        locale: args.locale.clone(),
        country: args.country.clone(),
        ..SessionPreferences::default()
    };
    let mut session = match args.base_url.as_deref() {
        Some(base_url) => SessionClient::with_base_url(base_url, &preferences)?,
        None => SessionClient::new(&preferences)?,
    };
    session
        .login(username, password)
        .await
        .context("Login failed")?;
    info!("Login successful");

    let progress: Arc<dyn ProgressSink> = if args.quiet {
        Arc::new(SilentProgress::new())
    } else {
        Arc::new(ConsoleProgress::new())
    };

    let orchestrator = Orchestrator::new(
        Arc::new(session),
        Arc::new(HegreParser),
        Arc::new(archive),
        progress,
        config,
        RetryPolicy::default(),
    );
    let stats = orchestrator.run(&args.urls).await;

    info!(
        completed = stats.completed(),
        skipped = stats.skipped(),
        failed = stats.failed(),
        retried = stats.retried(),
        total = stats.total(),
        "Download complete"
    );
    if !args.quiet {
        println!(
            "{} downloaded, {} skipped, {} failed ({} transferred)",
            stats.completed(),
            stats.skipped(),
            stats.failed(),
            convert_size(stats.bytes())
        );
    }

    Ok(determine_exit_outcome(
        stats.completed() + stats.skipped(),
        stats.failed(),
    ))
}
