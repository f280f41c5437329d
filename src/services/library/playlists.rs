use std::sync::Arc;

use futures::Stream;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::{Playlist, PlaylistId, PlaylistStore, TrackId};
use crate::services::common::Property;

/// Outcome of toggling a set of tracks in the favorites playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesChange {
    /// Missing tracks were appended; holds how many
    Added(usize),
    /// Every track was already present and all were removed; holds how many ids were removed
    Removed(usize),
    /// Nothing to do (empty track set)
    Unchanged,
}

/// Owns the in-memory playlist list and persists it after every mutation.
///
/// The in-memory list is authoritative. Save failures are logged and the
/// next mutation writes the whole list again, reconciling the store.
pub struct PlaylistManager {
    store: Arc<dyn PlaylistStore>,
    playlists: Property<Vec<Playlist>>,
    favorites_name: String,
    writer: Mutex<()>,
}

impl PlaylistManager {
    /// Create a manager over `store`. Call [`load`](Self::load) to read existing playlists.
    pub fn new(store: Arc<dyn PlaylistStore>, favorites_name: impl Into<String>) -> Self {
        Self {
            store,
            playlists: Property::new(Vec::new()),
            favorites_name: favorites_name.into(),
            writer: Mutex::new(()),
        }
    }

    /// Replace the in-memory list with the stored playlists.
    ///
    /// A failed load is logged and leaves the current list untouched.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let _guard = self.writer.lock().await;

        match self.store.load().await {
            Ok(playlists) => {
                info!("Loaded {} playlists", playlists.len());
                self.playlists.set(playlists);
            }
            Err(e) => warn!("Failed to load playlists, keeping in-memory list: {e}"),
        }
    }

    /// Snapshot of every playlist.
    pub fn playlists(&self) -> Vec<Playlist> {
        self.playlists.get()
    }

    /// Stream of the playlist list, starting with the current value.
    pub fn playlists_monitored(&self) -> impl Stream<Item = Vec<Playlist>> + Send + use<> {
        self.playlists.watch()
    }

    /// Look up a playlist by id.
    pub fn get(&self, id: &PlaylistId) -> Option<Playlist> {
        self.playlists.get().into_iter().find(|p| &p.id == id)
    }

    /// Create an empty playlist. Blank names are ignored.
    pub async fn create(&self, name: &str) -> Option<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let playlist = Playlist::new(name);
        self.mutate(|list| {
            list.push(playlist.clone());
            Some(playlist)
        })
        .await
    }

    /// Delete a playlist. Returns false if it did not exist.
    pub async fn delete(&self, id: &PlaylistId) -> bool {
        self.mutate(|list| {
            let before = list.len();
            list.retain(|p| &p.id != id);
            (list.len() != before).then_some(())
        })
        .await
        .is_some()
    }

    /// Rename a playlist. Blank names and unknown ids are ignored.
    pub async fn rename(&self, id: &PlaylistId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        self.mutate(|list| {
            let playlist = list.iter_mut().find(|p| &p.id == id)?;
            if playlist.name == name {
                return None;
            }
            playlist.name = name.to_string();
            Some(())
        })
        .await
        .is_some()
    }

    /// Append a track unless the playlist already contains it.
    pub async fn add_track(&self, id: &PlaylistId, track: TrackId) -> bool {
        self.mutate(|list| {
            let playlist = list.iter_mut().find(|p| &p.id == id)?;
            if playlist.track_ids.contains(&track) {
                return None;
            }
            playlist.track_ids.push(track);
            Some(())
        })
        .await
        .is_some()
    }

    /// Remove the first occurrence of a track.
    pub async fn remove_track(&self, id: &PlaylistId, track: TrackId) -> bool {
        self.mutate(|list| {
            let playlist = list.iter_mut().find(|p| &p.id == id)?;
            let index = playlist.track_ids.iter().position(|t| *t == track)?;
            playlist.track_ids.remove(index);
            Some(())
        })
        .await
        .is_some()
    }

    /// Toggle a group of tracks (e.g. an album) in the favorites playlist.
    ///
    /// Creates the favorites playlist when missing. If every track is already
    /// a favorite they are all removed, otherwise the missing ones are appended.
    pub async fn toggle_favorites(&self, tracks: &[TrackId]) -> FavoritesChange {
        if tracks.is_empty() {
            return FavoritesChange::Unchanged;
        }

        let favorites_name = self.favorites_name.clone();
        self.mutate(|list| {
            let index = match list.iter().position(|p| p.name == favorites_name) {
                Some(index) => index,
                None => {
                    list.push(Playlist::new(favorites_name.as_str()));
                    list.len() - 1
                }
            };
            let favorites = &mut list[index];

            let all_present = tracks.iter().all(|t| favorites.track_ids.contains(t));
            if all_present {
                let before = favorites.track_ids.len();
                favorites.track_ids.retain(|t| !tracks.contains(t));
                Some(FavoritesChange::Removed(before - favorites.track_ids.len()))
            } else {
                let mut added = 0;
                for track in tracks {
                    if !favorites.track_ids.contains(track) {
                        favorites.track_ids.push(*track);
                        added += 1;
                    }
                }
                Some(FavoritesChange::Added(added))
            }
        })
        .await
        .unwrap_or(FavoritesChange::Unchanged)
    }

    async fn mutate<R>(&self, change: impl FnOnce(&mut Vec<Playlist>) -> Option<R>) -> Option<R> {
        let _guard = self.writer.lock().await;

        let mut list = self.playlists.get();
        let result = change(&mut list)?;
        self.playlists.set(list.clone());
        self.persist(&list).await;

        Some(result)
    }

    async fn persist(&self, playlists: &[Playlist]) {
        if let Err(e) = self.store.save(playlists).await {
            warn!("Failed to save playlists, keeping in-memory state: {e}");
        }
    }
}
