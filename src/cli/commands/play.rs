use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument};

use crate::{
    cli::{
        CliError, CommandResult,
        formatting::{
            format_description, format_error, format_header, format_status, format_track,
            parse_seek,
        },
    },
    config::Config,
    services::{
        library::{MediaKind, MemoryCatalog, SortOption, Track, TrackCatalog, TrackId, view},
        playback::{PlaybackError, PlaybackSession, SimulatedEngine},
    },
};

use super::playlists::{find_playlist, open_manager};

/// Arguments of the `play` command
#[derive(Debug, Clone)]
pub struct PlayRequest {
    /// JSON catalog path
    pub catalog: PathBuf,
    /// Playlist id or name restricting the tracks
    pub playlist: Option<String>,
    /// First track index
    pub index: usize,
    /// Start shuffled
    pub shuffle: bool,
    /// Title/artist filter
    pub search: Option<String>,
    /// Catalog ordering
    pub sort: SortOption,
}

/// A line typed into the interactive player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Toggle play/pause
    Toggle,
    /// Resume
    Play,
    /// Pause
    Pause,
    /// Next track
    Next,
    /// Previous track or restart
    Previous,
    /// Seek to the given position expression
    Seek(String),
    /// Toggle shuffle
    Shuffle,
    /// Cycle repeat
    Repeat,
    /// Print the status line
    Status,
    /// Print the play order
    Queue,
    /// Retry the engine connection
    Reconnect,
    /// Print the command list
    Help,
    /// Leave the player
    Quit,
}

impl FromStr for ReplCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = words.collect();

        let parsed = match command.as_str() {
            "p" | "toggle" => Self::Toggle,
            "play" => Self::Play,
            "pause" => Self::Pause,
            "n" | "next" => Self::Next,
            "b" | "prev" | "previous" => Self::Previous,
            "s" | "seek" => match rest.as_slice() {
                [position] => Self::Seek((*position).to_string()),
                _ => {
                    return Err(CliError::InvalidArgument {
                        arg: "position".to_string(),
                        reason: "Usage: seek <position>".to_string(),
                    });
                }
            },
            "shuffle" => Self::Shuffle,
            "repeat" => Self::Repeat,
            "status" | "" => Self::Status,
            "queue" | "ls" => Self::Queue,
            "reconnect" => Self::Reconnect,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => {
                return Err(CliError::InvalidArgument {
                    arg: "command".to_string(),
                    reason: format!("Unknown command '{other}', type 'help'"),
                });
            }
        };

        Ok(parsed)
    }
}

const HELP: &str = "\
  p, toggle        play/pause
  play, pause      resume or pause
  n, next          next track
  b, previous      previous track (restarts after 3s)
  s, seek <pos>    seconds, mm:ss, 50%, +10, -10
  shuffle, repeat  toggle shuffle, cycle repeat
  status, queue    show state or play order
  reconnect        retry the engine connection
  q, quit          stop and exit";

fn session_error(error: PlaybackError) -> CliError {
    CliError::ServiceError {
        service: "Playback".to_string(),
        details: error.to_string(),
    }
}

/// Pick the tracks a `play` request refers to.
///
/// A playlist restricts the catalog to its tracks in playlist order;
/// otherwise the catalog is ordered by `sort`. A search that matches
/// nothing falls back to the unfiltered list.
///
/// # Errors
/// Returns `CliError::PlaylistNotFound` for an unknown playlist
pub async fn select_tracks(
    request: &PlayRequest,
    catalog: &dyn TrackCatalog,
    config: &Config,
) -> Result<Vec<Track>, CliError> {
    let all = catalog.list_tracks(MediaKind::Audio).await;
    let query = request.search.as_deref().unwrap_or_default();

    let Some(key) = &request.playlist else {
        let visible = view::filter_and_sort(&all, query, request.sort);
        return Ok(view::play_all_source(&visible, &all).to_vec());
    };

    let manager = open_manager(config).await?;
    let playlist = find_playlist(&manager, key)?;
    let source = view::playlist_tracks(&playlist, &all);

    let matching: HashSet<TrackId> = view::filter_and_sort(&source, query, request.sort)
        .iter()
        .map(|track| track.id)
        .collect();
    let visible: Vec<Track> = source
        .iter()
        .filter(|track| matching.contains(&track.id))
        .cloned()
        .collect();

    Ok(view::play_all_source(&visible, &source).to_vec())
}

/// Run the interactive player.
///
/// # Errors
/// Returns `CliError` if the catalog cannot be loaded, holds nothing
/// playable, or the start index is out of range
#[instrument(skip(config))]
pub async fn execute(request: PlayRequest, config: &Config) -> CommandResult {
    let catalog = MemoryCatalog::from_json_file(&request.catalog)?;
    let tracks = select_tracks(&request, &catalog, config).await?;

    if tracks.is_empty() {
        return Err(CliError::InvalidArgument {
            arg: "catalog".to_string(),
            reason: "No audio tracks to play".to_string(),
        });
    }
    if request.index >= tracks.len() {
        return Err(CliError::InvalidArgument {
            arg: "index".to_string(),
            reason: format!("Index {} out of range for {} tracks", request.index, tracks.len()),
        });
    }

    let titles: HashMap<TrackId, Track> =
        tracks.iter().map(|track| (track.id, track.clone())).collect();

    let session = PlaybackSession::start(Arc::new(SimulatedEngine::new()), &config.playback);
    let started = if request.shuffle && request.index == 0 {
        session.play_collection(tracks, true)
    } else {
        session.set_queue(tracks, request.index, request.shuffle)
    };
    started.map_err(session_error)?;

    println!("{}", format_header("reel"));
    println!("{}", format_description("Type 'help' for commands"));

    let result = repl(&session, &titles).await;
    session.dispose().await;
    result?;

    Ok("Playback stopped".to_string())
}

async fn repl(session: &PlaybackSession, titles: &HashMap<TrackId, Track>) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut queue_changes = Box::pin(session.watch_queue());
    let mut ready_changes = Box::pin(session.ready_monitored());
    let mut now_playing: Option<TrackId> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    return Ok(());
                };

                match line.parse::<ReplCommand>() {
                    Ok(ReplCommand::Quit) => return Ok(()),
                    Ok(command) => {
                        if let Err(e) = apply(session, command, titles).await {
                            println!("{}", format_error(&e.to_string()));
                        }
                    }
                    Err(e) => println!("{}", format_error(&e.to_string())),
                }
            }

            Some(summary) = queue_changes.next() => {
                let current = summary.current_track.as_ref().map(|track| track.id);
                if current != now_playing {
                    now_playing = current;
                    if let Some(track) = &summary.current_track {
                        println!("Now playing: {}", format_track(track));
                    }
                }
            }

            Some(ready) = ready_changes.next() => {
                if ready {
                    println!("{}", format_description("Engine ready"));
                }
            }
        }
    }
}

async fn apply(
    session: &PlaybackSession,
    command: ReplCommand,
    titles: &HashMap<TrackId, Track>,
) -> Result<(), CliError> {
    let sent = match command {
        ReplCommand::Toggle => session.toggle_play_pause(),
        ReplCommand::Play => session.play(),
        ReplCommand::Pause => session.pause(),
        ReplCommand::Next => session.next(),
        ReplCommand::Previous => session.previous(),
        ReplCommand::Seek(position) => {
            let state = session.state();
            let target = parse_seek(&position, state.position_ms, state.duration_ms)?;
            session.seek_to(target)
        }
        ReplCommand::Shuffle => session.toggle_shuffle(),
        ReplCommand::Repeat => session.toggle_repeat(),
        ReplCommand::Reconnect => session.reconnect(),
        ReplCommand::Status => {
            session.settled().await.map_err(session_error)?;
            println!("{}", format_status(&session.state(), &session.queue_summary()));
            Ok(())
        }
        ReplCommand::Queue => {
            session.settled().await.map_err(session_error)?;
            let summary = session.queue_summary();
            for (i, id) in summary.play_order.iter().enumerate() {
                let marker = if summary.current_index == Some(i) { ">" } else { " " };
                let line = titles
                    .get(id)
                    .map_or_else(|| format!("track {id}"), format_track);
                println!("{marker} {:>3}. {line}", i + 1);
            }
            Ok(())
        }
        ReplCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ReplCommand::Quit => Ok(()),
    };
    sent.map_err(session_error)
}
