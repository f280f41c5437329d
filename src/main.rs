//! Reel command-line entry point
//!
//! The interactive player logs to a rolling file so the terminal stays
//! usable; every other command logs to stderr.

use std::{error::Error, fs, process};

use clap::Parser;
use reel::{
    cli::{self, Cli, Commands, formatting::format_error},
    config::{Config, ConfigPaths},
    tracing_config,
};
use tracing::{Level, info, instrument, span};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    };

    let _guard = if matches!(cli.command, Commands::Play { .. }) {
        Some(tracing_config::init_with_file(config.general.log_level)?)
    } else {
        tracing_config::init(config.general.log_level)?;
        None
    };
    let _span = span!(Level::INFO, "reel_main").entered();

    ensure_reel_directories()?;

    match cli::run(cli.command, config).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}

#[instrument]
fn ensure_reel_directories() -> Result<(), Box<dyn Error>> {
    let config_dir = ConfigPaths::config_dir()?;
    if !config_dir.exists() {
        info!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(&config_dir)?;
    }
    Ok(())
}
