use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, unique identifier of a track in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of media a catalog entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Played through the queue
    Audio,

    /// Played as a single item, outside the queue
    Video,

    /// Listed by the catalog, never played
    Image,
}

/// Immutable playable item supplied by the track catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identity
    pub id: TrackId,

    /// Opaque resource reference handed to the engine (e.g. a URI)
    pub locator: String,

    /// Display title
    pub title: String,

    /// Performing artist, when known
    #[serde(default)]
    pub artist: Option<String>,

    /// Catalog duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,

    /// Media kind
    pub kind: MediaKind,

    /// Album the track belongs to, when known
    #[serde(default)]
    pub album_id: Option<u64>,

    /// Album name, when known
    #[serde(default)]
    pub album: Option<String>,
}

impl Track {
    /// Create a track with no artist, album or duration.
    pub fn new(
        id: TrackId,
        locator: impl Into<String>,
        title: impl Into<String>,
        kind: MediaKind,
    ) -> Self {
        Self {
            id,
            locator: locator.into(),
            title: title.into(),
            artist: None,
            duration_ms: 0,
            kind,
            album_id: None,
            album: None,
        }
    }

    /// Set the artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the catalog duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Attach the track to an album.
    pub fn with_album(mut self, album_id: u64, name: impl Into<String>) -> Self {
        self.album_id = Some(album_id);
        self.album = Some(name.into());
        self
    }
}

/// Album derived from the audio tracks that reference it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    /// Album identifier shared by its tracks
    pub id: u64,

    /// Album name
    pub name: String,

    /// Artist of the first track, or "Unknown Artist"
    pub artist: String,

    /// Number of tracks in the album
    pub song_count: usize,
}

/// Unique identifier of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named, ordered set of track ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique identifier
    pub id: PlaylistId,

    /// Display name
    pub name: String,

    /// Track ids in playback order; duplicates are allowed
    #[serde(default)]
    pub track_ids: Vec<TrackId>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create an empty playlist named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            track_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
