use std::{path::Path, sync::Arc};

use crate::{
    cli::{
        CliError, CommandResult, PlaylistsCommand,
        formatting::{format_description, format_header, format_playlist, format_track},
    },
    config::Config,
    services::library::{
        FavoritesChange, JsonPlaylistStore, MediaKind, MemoryCatalog, Playlist, PlaylistManager,
        TrackCatalog, TrackId, view,
    },
};

/// Open the playlist manager configured in `config` and load its playlists.
///
/// # Errors
/// Returns `CliError` if the playlist file location cannot be determined
pub async fn open_manager(config: &Config) -> Result<PlaylistManager, CliError> {
    let path = config.library.playlists_path()?;
    let manager = PlaylistManager::new(
        Arc::new(JsonPlaylistStore::new(path)),
        config.library.favorites_name.clone(),
    );
    manager.load().await;
    Ok(manager)
}

/// Find a playlist by exact id, then by case-insensitive name.
///
/// # Errors
/// Returns `CliError::PlaylistNotFound` when nothing matches
pub fn find_playlist(manager: &PlaylistManager, key: &str) -> Result<Playlist, CliError> {
    let playlists = manager.playlists();

    playlists
        .iter()
        .find(|p| p.id.as_str() == key)
        .or_else(|| playlists.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
        .cloned()
        .ok_or_else(|| CliError::PlaylistNotFound(key.to_string()))
}

/// Execute a `playlists` subcommand.
///
/// # Errors
/// Returns `CliError` for unknown playlists, invalid names or unreadable catalogs
pub async fn execute(command: PlaylistsCommand, config: &Config) -> CommandResult {
    let manager = open_manager(config).await?;

    match command {
        PlaylistsCommand::List => Ok(list(&manager)),
        PlaylistsCommand::Show { playlist, catalog } => {
            let playlist = find_playlist(&manager, &playlist)?;
            show(&playlist, catalog.as_deref()).await
        }
        PlaylistsCommand::Create { name } => {
            let playlist = manager
                .create(&name)
                .await
                .ok_or_else(|| CliError::InvalidArgument {
                    arg: "name".to_string(),
                    reason: "Playlist name cannot be blank".to_string(),
                })?;
            Ok(format!("Created {}", format_playlist(&playlist)))
        }
        PlaylistsCommand::Delete { playlist } => {
            let playlist = find_playlist(&manager, &playlist)?;
            manager.delete(&playlist.id).await;
            Ok(format!("Deleted playlist '{}'", playlist.name))
        }
        PlaylistsCommand::Rename { playlist, name } => {
            let playlist = find_playlist(&manager, &playlist)?;
            if manager.rename(&playlist.id, &name).await {
                Ok(format!("Renamed '{}' to '{}'", playlist.name, name.trim()))
            } else {
                Ok(format!("Playlist '{}' unchanged", playlist.name))
            }
        }
        PlaylistsCommand::Add { playlist, track } => {
            let playlist = find_playlist(&manager, &playlist)?;
            if manager.add_track(&playlist.id, TrackId(track)).await {
                Ok(format!("Added track {track} to '{}'", playlist.name))
            } else {
                Ok(format!("Track {track} is already in '{}'", playlist.name))
            }
        }
        PlaylistsCommand::Remove { playlist, track } => {
            let playlist = find_playlist(&manager, &playlist)?;
            if manager.remove_track(&playlist.id, TrackId(track)).await {
                Ok(format!("Removed track {track} from '{}'", playlist.name))
            } else {
                Ok(format!("Track {track} is not in '{}'", playlist.name))
            }
        }
        PlaylistsCommand::Favorite { tracks } => {
            let ids: Vec<TrackId> = tracks.into_iter().map(TrackId).collect();
            Ok(match manager.toggle_favorites(&ids).await {
                FavoritesChange::Added(count) => format!("Added {count} tracks to favorites"),
                FavoritesChange::Removed(count) => {
                    format!("Removed {count} tracks from favorites")
                }
                FavoritesChange::Unchanged => "Favorites unchanged".to_string(),
            })
        }
    }
}

fn list(manager: &PlaylistManager) -> String {
    let playlists = manager.playlists();
    if playlists.is_empty() {
        return format_description("No playlists");
    }

    let mut output = vec![format_header("Playlists")];
    output.extend(
        playlists
            .iter()
            .map(|playlist| format!("  {}", format_playlist(playlist))),
    );
    output.join("\n")
}

async fn show(playlist: &Playlist, catalog: Option<&Path>) -> CommandResult {
    let mut output = vec![format_playlist(playlist)];

    match catalog {
        Some(path) => {
            let catalog = MemoryCatalog::from_json_file(path)?;
            let tracks = catalog.list_tracks(MediaKind::Audio).await;
            output.extend(
                view::playlist_tracks(playlist, &tracks)
                    .iter()
                    .enumerate()
                    .map(|(i, track)| format!("  {:>3}. {}", i + 1, format_track(track))),
            );
        }
        None => output.extend(
            playlist
                .track_ids
                .iter()
                .map(|id| format!("  track {id}")),
        ),
    }

    Ok(output.join("\n"))
}
