/// Errors from the engine connection
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine refused or failed the connection
    #[error("engine connection failed: {0}")]
    ConnectionFailed(String),
}

/// Queue operations that were rejected and left the queue unchanged
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue holds no tracks
    #[error("queue is empty")]
    Empty,

    /// Start index outside the supplied track list
    #[error("start index {index} out of bounds for {len} tracks")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the track list
        len: usize,
    },
}

/// Errors surfaced by the playback session API
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The session was disposed; no further commands are processed
    #[error("playback session closed")]
    SessionClosed,
}
