//! `melodica` -- console audio player.
//!
//! Loads a playlist of MP3 URLs or paths and plays it through the default
//! audio device, steered from a full-screen terminal UI.

mod app;
mod cli;
mod logging;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use melodica_audio::{AudioSink, EngineOptions, FetchOptions, PlaybackEngine, RodioOutput};
use melodica_config::{MelodicaConfig, load_config};
use melodica_core::{Playlist, PlayerState, Volume};

use cli::Cli;

const USAGE: &str = "Usage: melodica <playlist.txt>";

fn main() {
    let cli = Cli::parse();

    if cli.help {
        eprint!("{}", cli::help_text());
        process::exit(2);
    }

    if let Err(e) = run(cli) {
        tracing::error!(error = %format!("{e:#}"), "melodica exited with an error");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = effective_config(&cli)?;

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let log_file = match logging::open_log_file(&config.log_file) {
        Ok(file) => file,
        Err(e) => {
            println!("Failed to open log file: {e}");
            process::exit(1);
        }
    };
    logging::init(log_file, &config.log_level)?;

    let Some(playlist_path) = cli.playlist.as_deref() else {
        println!("{USAGE}");
        process::exit(1);
    };

    tracing::info!(
        playlist = %playlist_path.display(),
        config = ?config.source,
        "starting melodica"
    );
    let playlist = Playlist::load(playlist_path).map_err(|e| {
        tracing::error!(error = %e, "could not load playlist");
        e
    })
    .context("could not load playlist")?;

    let (_output, sink) = RodioOutput::open_default().context("could not open audio output")?;
    let sink: Arc<dyn AudioSink> = Arc::new(sink);

    let volume = Volume::new(
        config.volume.initial,
        config.volume.step,
        config.volume.max,
    );
    let (engine, events) = PlaybackEngine::new(sink, engine_options(&config), volume.level());
    let state = PlayerState::new(playlist, volume).with_auto_advance(config.playback.auto_advance);

    app::run(app::Controller::new(state, engine), events)
}

/// Configuration from file and environment with CLI overrides applied.
fn effective_config(cli: &Cli) -> Result<MelodicaConfig> {
    let mut config = load_config(cli.config.as_deref()).context("could not load configuration")?;
    if let Some(level) = cli.volume {
        config.volume.initial = level;
    }
    if let Some(ref path) = cli.log_file {
        config.log_file = path.clone();
    }
    config.validate().context("invalid command-line option")?;
    Ok(config)
}

fn engine_options(config: &MelodicaConfig) -> EngineOptions {
    EngineOptions {
        fetch: FetchOptions {
            timeout: Duration::from_secs(config.network.timeout_secs),
            max_bytes: config.network.max_track_bytes,
        },
        pause_poll: Duration::from_millis(config.playback.pause_poll_ms),
        queue_chunks: config.playback.queue_chunks,
    }
}
