//! Playback orchestration: queue, engine connection, position clock and
//! the session that serializes everything against one writer.
//!
//! Control flows from [`PlaybackSession`] commands through the
//! [`TransportController`] into [`PlaybackQueue`] transitions and
//! [`EngineHandle`] commands. Engine events and clock samples come back
//! through the same session actor.

/// Position sampler
pub mod clock;
/// Intent and engine-event handling
pub mod controller;
/// Engine handle, backend contract and simulated engine
pub mod engine;
/// Playback error types
pub mod error;
/// Queue state machine and shuffle
pub mod queue;
/// Session actor and public command API
pub mod session;
/// Playback state types
pub mod types;

#[cfg(test)]
mod tests;

pub use clock::{ClockSample, PositionClock};
pub use controller::TransportController;
pub use engine::{
    EngineConnection, EngineEvent, EngineEventSink, EngineHandle, PlaybackEngine,
    simulated::SimulatedEngine,
};
pub use error::{EngineError, PlaybackError, QueueError};
pub use queue::{
    Advance, DEFAULT_RESTART_THRESHOLD_MS, PlaybackQueue, shuffled_queue, shuffled_queue_with,
};
pub use session::PlaybackSession;
pub use types::{
    ConnectionState, Direction, PlaybackState, QueueSummary, RepeatMode, TransportState,
};
