use crate::services::library::{Track, TrackId};

/// Repeat policy applied when a track ends on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Advance to the next track
    #[default]
    Off,

    /// Advance to the next track, wrapping after the last one
    All,

    /// Replay the current track
    One,
}

impl RepeatMode {
    /// The mode `toggle_repeat` moves to: Off → All → One → Off.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Direction of an explicit skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Skip forward
    Next,

    /// Skip back, or restart the current track past the restart threshold
    Previous,
}

/// Transport state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Nothing loaded
    #[default]
    Idle,

    /// Media handed to the engine, playback not confirmed
    Loaded,

    /// Playing
    Playing,

    /// Paused, or stopped at the end of the queue
    Paused,
}

/// Engine connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// A connection attempt is in flight
    Connecting,

    /// Connected; commands reach the engine
    Ready,

    /// Not connected; commands are dropped
    #[default]
    Disconnected,
}

/// Observable playback state mirrored from the engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackState {
    /// Track currently loaded
    pub current_track: Option<Track>,

    /// Whether the engine reports playback in progress
    pub is_playing: bool,

    /// Playback position in milliseconds
    pub position_ms: u64,

    /// Duration of the current track in milliseconds
    pub duration_ms: u64,
}

/// Read-only view of the queue for the UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSummary {
    /// Track at the current index
    pub current_track: Option<Track>,

    /// Current index into the play order
    pub current_index: Option<usize>,

    /// Ids in play order
    pub play_order: Vec<TrackId>,

    /// Whether an explicit "next" has somewhere to go
    pub has_next: bool,

    /// Whether an explicit "previous" has somewhere to go
    pub has_previous: bool,

    /// Shuffle flag
    pub shuffle: bool,

    /// Repeat policy
    pub repeat: RepeatMode,

    /// Transport state
    pub transport: TransportState,
}
