//! Command-line front end.
//!
//! `play` runs an interactive playback session against the simulated
//! engine, `playlists` manages the playlist file and `config` inspects the
//! configuration. Commands return their output as text; the binary prints it.

mod commands;
pub mod formatting;
mod types;


use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::play::{PlayRequest, ReplCommand, select_tracks};
pub use types::{CliError, CommandResult};

use crate::{config::Config, services::library::SortOption};

/// Reel command line
#[derive(Debug, Parser)]
#[command(name = "reel")]
#[command(about = "Local media playback from the command line")]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play tracks from a JSON catalog interactively
    Play {
        /// JSON file holding an array of tracks
        catalog: PathBuf,

        /// Play only the tracks of this playlist (id or name)
        #[arg(short, long)]
        playlist: Option<String>,

        /// Index of the first track to play
        #[arg(short, long, default_value_t = 0)]
        index: usize,

        /// Shuffle, starting from a random track unless --index is given
        #[arg(short, long)]
        shuffle: bool,

        /// Only play tracks whose title or artist contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Catalog order: title, title-desc, duration, duration-desc or recent
        #[arg(long, default_value = "recent")]
        sort: SortOption,
    },

    /// Manage playlists
    Playlists {
        /// Playlist operation
        #[command(subcommand)]
        command: PlaylistsCommand,
    },

    /// Inspect the configuration
    Config {
        /// Configuration operation
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Playlist operations
#[derive(Debug, Subcommand)]
pub enum PlaylistsCommand {
    /// List every playlist
    List,

    /// Show the tracks of a playlist, resolved against a catalog
    Show {
        /// Playlist id or name
        playlist: String,
        /// JSON catalog used to resolve track ids
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },

    /// Delete a playlist
    Delete {
        /// Playlist id or name
        playlist: String,
    },

    /// Rename a playlist
    Rename {
        /// Playlist id or name
        playlist: String,
        /// New name
        name: String,
    },

    /// Add a track to a playlist
    Add {
        /// Playlist id or name
        playlist: String,
        /// Track id
        track: u64,
    },

    /// Remove the first occurrence of a track from a playlist
    Remove {
        /// Playlist id or name
        playlist: String,
        /// Track id
        track: u64,
    },

    /// Toggle tracks in the favorites playlist
    Favorite {
        /// Track ids
        #[arg(required = true)]
        tracks: Vec<u64>,
    },
}

/// Configuration operations
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the JSON schema of the configuration file
    Schema,

    /// Print the configuration file location
    Path,
}

/// Run `command` with the loaded configuration.
///
/// # Errors
/// Returns `CliError` when the command cannot complete
pub async fn run(command: Commands, config: Config) -> CommandResult {
    match command {
        Commands::Play {
            catalog,
            playlist,
            index,
            shuffle,
            search,
            sort,
        } => {
            let request = commands::play::PlayRequest {
                catalog,
                playlist,
                index,
                shuffle,
                search,
                sort,
            };
            commands::play::execute(request, &config).await
        }
        Commands::Playlists { command } => commands::playlists::execute(command, &config).await,
        Commands::Config { command } => commands::config::execute(command, &config),
    }
}
