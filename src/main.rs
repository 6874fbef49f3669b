//! Stylist - a virtual stylist in the terminal.
//!
//! Upload a photo of a clothing item and get three outfit ideas (Casual,
//! Business, Night Out), each rendered as a flat-lay image that can be
//! refined with free-text edits.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod intake;
mod model;
mod output;
mod params;
mod ports;
mod prompts;
mod session;
mod terminal;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::StylistError;
use crate::model::{resolve_model, validate_model};
use crate::params::validate_aspect_ratio;
use crate::session::{Coordinator, RevealPolicy, Settings};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "stylist=debug" } else { "stylist=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), StylistError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(StylistError::Config)?;
    debug!(path = %config_path.display(), "config loaded");

    let settings = settings(&cli, &config)?;
    let output_dir = PathBuf::from(cli.output_dir.as_deref().unwrap_or(&config.output.dir));
    info!(
        ideas_model = %settings.ideas_model,
        image_model = %settings.image_model,
        reveal = ?settings.reveal,
        "session settings"
    );

    // Create services based on mode (live / recording / replaying)
    let replay_path = std::env::var("STYLIST_REPLAY").ok();
    let is_recording = std::env::var("STYLIST_REC").is_ok_and(|v| v == "true" || v == "1");

    let (services, recording_session) = if let Some(ref cassette_path) = replay_path {
        info!(cassette = %cassette_path, "replaying");
        (context::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        info!("recording mode enabled");
        let (services, session) = context::recording(&config)?;
        (services, Some(session))
    } else {
        (context::live(&config)?, None)
    };

    let mut terminal = Terminal::new(Coordinator::new(services, settings), output_dir);
    if let Some(image) = cli.image.as_deref() {
        terminal.upload(Path::new(image))?;
    }
    let result = terminal.run(BufReader::new(tokio::io::stdin())).await;

    // Finish recording if active
    if let Some(session) = recording_session {
        match session.finish() {
            Ok((path, count)) => info!(path = %path.display(), interactions = count, "cassette saved"),
            Err(e) => warn!(error = %e, "failed to save cassette"),
        }
    }

    result
}

/// Resolve and validate request settings; CLI flags override config values.
fn settings(cli: &Cli, config: &Config) -> Result<Settings, StylistError> {
    let ideas_model = resolve_model(cli.ideas_model.as_deref().unwrap_or(&config.models.ideas));
    let image_model = resolve_model(cli.image_model.as_deref().unwrap_or(&config.models.image));
    validate_model(&ideas_model).map_err(StylistError::InvalidArgument)?;
    validate_model(&image_model).map_err(StylistError::InvalidArgument)?;

    let aspect_ratio = cli.aspect_ratio.clone().or_else(|| config.session.aspect_ratio.clone());
    if let Some(ratio) = &aspect_ratio {
        validate_aspect_ratio(ratio).map_err(StylistError::InvalidArgument)?;
    }

    let reveal = cli.reveal.as_deref().unwrap_or(&config.session.reveal);
    let reveal = RevealPolicy::from_name(reveal).map_err(StylistError::InvalidArgument)?;

    Ok(Settings { ideas_model, image_model, aspect_ratio, reveal })
}
