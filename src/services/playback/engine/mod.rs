//! Connection to the external playback engine.
//!
//! The handle connects lazily and asynchronously. Until it is ready every
//! transport command is accepted and dropped, so callers never wait on
//! the engine and never see an error for an unavailable one.

mod backend;
/// In-process engine used by the CLI and tests
pub mod simulated;

use std::sync::{Arc, Mutex};

use futures::{Stream, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

pub use backend::{EngineConnection, EngineEvent, EngineEventSink, PlaybackEngine};
pub(crate) use backend::lock;
use backend::ListenerSlot;

use super::{ConnectionState, EngineError};
use crate::services::{common::Property, library::Track};

struct Slot {
    connection: Option<Arc<dyn EngineConnection>>,
    attempt: u64,
    task: Option<JoinHandle<()>>,
}

struct Inner {
    backend: Arc<dyn PlaybackEngine>,
    slot: Mutex<Slot>,
    listener: ListenerSlot,
    state: Property<ConnectionState>,
}

/// Owned handle to the playback engine for one session.
///
/// Cloning shares the same connection.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Inner>,
}

impl EngineHandle {
    /// Create a disconnected handle for `backend`.
    pub fn new(backend: Arc<dyn PlaybackEngine>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                slot: Mutex::new(Slot {
                    connection: None,
                    attempt: 0,
                    task: None,
                }),
                listener: Arc::new(Mutex::new(None)),
                state: Property::new(ConnectionState::Disconnected),
            }),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.get()
    }

    /// Whether commands currently reach the engine.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Stream of connection states, starting with the current one.
    pub fn state_monitored(&self) -> impl Stream<Item = ConnectionState> + Send + use<> {
        self.inner.state.watch()
    }

    /// Stream of the "engine ready" flag, starting with the current value.
    pub fn ready_monitored(&self) -> impl Stream<Item = bool> + Send + use<> {
        self.inner
            .state
            .watch()
            .map(|state| state == ConnectionState::Ready)
    }

    /// Register the single event listener, replacing any previous one.
    pub fn subscribe(&self, listener: mpsc::UnboundedSender<EngineEvent>) {
        *lock(&self.inner.listener) = Some(listener);
    }

    /// Drop the event listener. Later events are discarded.
    pub fn unsubscribe(&self) {
        lock(&self.inner.listener).take();
    }

    /// Start a connection attempt in the background.
    ///
    /// No-op while an attempt is in flight or the handle is ready. The
    /// outcome is reported to the listener as `Connected` or
    /// `ConnectionFailed`; failures are not retried.
    #[instrument(skip(self))]
    pub fn connect(&self) {
        let mut slot = lock(&self.inner.slot);

        let state = self.inner.state.get();
        if state != ConnectionState::Disconnected {
            debug!("Connect ignored, engine is {state:?}");
            return;
        }

        slot.attempt += 1;
        let attempt = slot.attempt;
        self.inner.state.set(ConnectionState::Connecting);

        let inner = Arc::clone(&self.inner);
        let sink = EngineEventSink::new(Arc::clone(&self.inner.listener));
        slot.task = Some(tokio::spawn(async move {
            let result = inner.backend.connect(sink).await;
            inner.resolve(attempt, result);
        }));

        debug!("Engine connection attempt {attempt} started");
    }

    /// Release the connection and cancel any attempt in flight. Idempotent.
    #[instrument(skip(self))]
    pub fn dispose(&self) {
        let (connection, task) = {
            let mut slot = lock(&self.inner.slot);
            slot.attempt += 1;
            (slot.connection.take(), slot.task.take())
        };

        if let Some(task) = task {
            task.abort();
        }
        if let Some(connection) = connection {
            connection.release();
            info!("Engine connection released");
        }

        self.inner.state.set(ConnectionState::Disconnected);
    }

    /// Load `track` and start playing it.
    pub fn load_and_play(&self, track: &Track) {
        self.with_connection("load_and_play", |engine| engine.load_and_play(track));
    }

    /// Resume playback.
    pub fn play(&self) {
        self.with_connection("play", |engine| engine.play());
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.with_connection("pause", |engine| engine.pause());
    }

    /// Seek the loaded media.
    pub fn seek(&self, position_ms: u64) {
        self.with_connection("seek", |engine| engine.seek(position_ms));
    }

    /// Tell the engine whether it may advance on its own.
    pub fn set_auto_advance_hint(&self, enabled: bool) {
        self.with_connection("set_auto_advance_hint", |engine| {
            engine.set_auto_advance_hint(enabled);
        });
    }

    /// Engine position, or `None` when not connected.
    pub fn position_ms(&self) -> Option<u64> {
        self.connection().map(|engine| engine.position_ms())
    }

    /// Engine duration, or `None` when not connected or unknown.
    pub fn duration_ms(&self) -> Option<u64> {
        self.connection().and_then(|engine| engine.duration_ms())
    }

    fn connection(&self) -> Option<Arc<dyn EngineConnection>> {
        lock(&self.inner.slot).connection.clone()
    }

    fn with_connection(&self, command: &str, send: impl FnOnce(&dyn EngineConnection)) {
        match self.connection() {
            Some(engine) => send(engine.as_ref()),
            None => debug!("Engine not ready, dropping {command}"),
        }
    }
}

impl Inner {
    fn resolve(&self, attempt: u64, result: Result<Arc<dyn EngineConnection>, EngineError>) {
        let mut slot = lock(&self.slot);

        if slot.attempt != attempt {
            drop(slot);
            debug!("Connection attempt {attempt} outlived its handle");
            if let Ok(connection) = result {
                connection.release();
            }
            return;
        }

        slot.task = None;
        let event = match result {
            Ok(connection) => {
                slot.connection = Some(connection);
                self.state.set(ConnectionState::Ready);
                info!("Engine connected");
                EngineEvent::Connected
            }
            Err(e) => {
                self.state.set(ConnectionState::Disconnected);
                warn!("Engine connection failed: {e}");
                EngineEvent::ConnectionFailed(e.to_string())
            }
        };
        drop(slot);

        EngineEventSink::new(Arc::clone(&self.listener)).emit(event);
    }
}
