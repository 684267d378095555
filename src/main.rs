use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flappy_pinch::{Backend, Config, logging};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "flappy-pinch",
    about = "Flappy Bird in the terminal, flapped with a pinch"
)]
struct Cli {
    /// TOML config file; every key is optional
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "sim")]
    backend: Backend,
    /// Directory holding the background, bird and logo images
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Defaults to flappy-pinch.log in the temp directory
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.unwrap_or_else(logging::default_log_path);
    logging::init(&log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("loading config")?,
        None => Config::default(),
    };
    if let Some(dir) = cli.assets {
        config.assets.dir = dir;
    }
    if cli.mute {
        config.audio.enabled = false;
    }
    info!(config = ?cli.config, log = %log_file.display(), "starting");

    flappy_pinch::run(&config, cli.backend).context("running game")
}
