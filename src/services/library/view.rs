//! Derived views over catalog track lists.
//!
//! These are pure functions over slices; the library never mutates tracks.

use std::{collections::HashMap, str::FromStr};

use super::{Album, Playlist, Track, TrackId};

/// Ordering applied to the audio list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Title, A to Z
    TitleAsc,
    /// Title, Z to A
    TitleDesc,
    /// Shortest first
    DurationAsc,
    /// Longest first
    DurationDesc,
    /// Newest first; catalog ids grow with insertion
    #[default]
    DateAddedDesc,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" | "title-asc" => Ok(Self::TitleAsc),
            "title-desc" => Ok(Self::TitleDesc),
            "duration" | "duration-asc" => Ok(Self::DurationAsc),
            "duration-desc" => Ok(Self::DurationDesc),
            "recent" | "date-added" => Ok(Self::DateAddedDesc),
            other => Err(format!(
                "unknown sort '{other}', expected title, title-desc, duration, duration-desc or recent"
            )),
        }
    }
}

/// Keep tracks whose title or artist contains `query` (case-insensitive),
/// then order them by `sort`. An empty query keeps everything.
pub fn filter_and_sort(tracks: &[Track], query: &str, sort: SortOption) -> Vec<Track> {
    let needle = query.to_lowercase();
    let mut result: Vec<Track> = tracks
        .iter()
        .filter(|track| needle.is_empty() || matches_query(track, &needle))
        .cloned()
        .collect();

    match sort {
        SortOption::TitleAsc => result.sort_by(|a, b| a.title.cmp(&b.title)),
        SortOption::TitleDesc => result.sort_by(|a, b| b.title.cmp(&a.title)),
        SortOption::DurationAsc => result.sort_by_key(|track| track.duration_ms),
        SortOption::DurationDesc => result.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms)),
        SortOption::DateAddedDesc => result.sort_by(|a, b| b.id.cmp(&a.id)),
    }

    result
}

fn matches_query(track: &Track, needle: &str) -> bool {
    track.title.to_lowercase().contains(needle)
        || track
            .artist
            .as_deref()
            .is_some_and(|artist| artist.to_lowercase().contains(needle))
}

/// The list "play all" should use: the visible list, or everything when
/// the filter left nothing visible.
pub fn play_all_source<'a>(visible: &'a [Track], all: &'a [Track]) -> &'a [Track] {
    if visible.is_empty() { all } else { visible }
}

/// Group tracks into albums, ordered by first appearance.
pub fn albums(tracks: &[Track]) -> Vec<Album> {
    let mut order: Vec<u64> = Vec::new();
    let mut by_id: HashMap<u64, Album> = HashMap::new();

    for track in tracks {
        let Some(album_id) = track.album_id else {
            continue;
        };

        by_id
            .entry(album_id)
            .and_modify(|album| album.song_count += 1)
            .or_insert_with(|| {
                order.push(album_id);
                Album {
                    id: album_id,
                    name: track
                        .album
                        .clone()
                        .unwrap_or_else(|| "Unknown Album".to_string()),
                    artist: track
                        .artist
                        .clone()
                        .unwrap_or_else(|| "Unknown Artist".to_string()),
                    song_count: 1,
                }
            });
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Tracks of one album, in catalog order.
pub fn album_tracks(tracks: &[Track], album_id: u64) -> Vec<Track> {
    tracks
        .iter()
        .filter(|track| track.album_id == Some(album_id))
        .cloned()
        .collect()
}

/// Resolve a playlist's ids against the catalog, keeping playlist order.
///
/// Ids missing from the catalog are skipped; duplicates are kept.
pub fn playlist_tracks(playlist: &Playlist, tracks: &[Track]) -> Vec<Track> {
    let by_id: HashMap<TrackId, &Track> = tracks.iter().map(|track| (track.id, track)).collect();

    playlist
        .track_ids
        .iter()
        .filter_map(|id| by_id.get(id).map(|track| (*track).clone()))
        .collect()
}
