use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::services::{library::Track, playback::EngineError};

/// Events delivered by the engine handle to its single listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The connection attempt succeeded
    Connected,

    /// The connection attempt failed; the handle is disconnected
    ConnectionFailed(String),

    /// The engine started or stopped playing
    StateChanged {
        /// Whether playback is in progress
        playing: bool,
    },

    /// The current media played to its natural end
    MediaEnded,

    /// The current media is ready and its duration is known
    MediaReady {
        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// The engine's own shuffle flag changed; the queue does not use it
    ShuffleChanged(bool),
}

pub(crate) type ListenerSlot = Arc<Mutex<Option<mpsc::UnboundedSender<EngineEvent>>>>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where an engine connection reports its events.
///
/// Events emitted while no listener is subscribed are discarded.
#[derive(Clone)]
pub struct EngineEventSink {
    listener: ListenerSlot,
}

impl EngineEventSink {
    pub(crate) fn new(listener: ListenerSlot) -> Self {
        Self { listener }
    }

    /// Deliver `event` to the subscribed listener. Returns false if nobody received it.
    pub fn emit(&self, event: EngineEvent) -> bool {
        match lock(&self.listener).as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}

/// An out-of-process playback engine that can be connected to.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Establish a connection. Engine events for it must be sent to `events`.
    ///
    /// # Errors
    /// Returns `EngineError::ConnectionFailed` when the engine cannot be reached
    async fn connect(&self, events: EngineEventSink)
    -> Result<Arc<dyn EngineConnection>, EngineError>;
}

/// Transport primitives of an established engine connection.
///
/// Commands are fire-and-forget and must not block; position queries return
/// the engine's latest known values.
pub trait EngineConnection: Send + Sync {
    /// Replace the loaded media with `track` and start playing it from zero.
    fn load_and_play(&self, track: &Track);

    /// Resume playback.
    fn play(&self);

    /// Pause playback.
    fn pause(&self);

    /// Seek the loaded media.
    fn seek(&self, position_ms: u64);

    /// Whether the engine may advance on its own at the end of media.
    fn set_auto_advance_hint(&self, _enabled: bool) {}

    /// Current position in milliseconds.
    fn position_ms(&self) -> u64;

    /// Duration of the loaded media, if known.
    fn duration_ms(&self) -> Option<u64>;

    /// Release the connection. Further commands are ignored.
    fn release(&self);
}
