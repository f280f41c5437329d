use std::sync::Arc;

use futures::Stream;
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, instrument};

use super::{
    ClockSample, ConnectionState, EngineEvent, EngineHandle, PlaybackEngine, PlaybackError,
    PlaybackState, QueueSummary, TransportController,
};
use crate::{
    config::PlaybackConfig,
    services::{common::Property, library::Track},
};

enum Command {
    SetQueue {
        tracks: Vec<Track>,
        start_index: usize,
        shuffle: bool,
    },
    PlayMedia {
        track: Track,
        context: Vec<Track>,
    },
    PlayCollection {
        tracks: Vec<Track>,
        shuffle: bool,
    },
    TogglePlayPause,
    Play,
    Pause,
    Next,
    Previous,
    SeekTo(i64),
    ToggleShuffle,
    ToggleRepeat,
    Reconnect,
    Settled(oneshot::Sender<()>),
    Shutdown,
}

/// One playback session: queue, observable state and engine connection.
///
/// Commands are queued to a single actor task that also receives engine
/// events and clock samples, so no two mutations interleave. Command methods
/// never wait on the engine.
pub struct PlaybackSession {
    commands: mpsc::UnboundedSender<Command>,
    state: Property<PlaybackState>,
    summary: Property<QueueSummary>,
    engine: EngineHandle,
    actor: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSession {
    /// Start a session against `engine` and begin connecting to it.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(engine, config))]
    pub fn start(engine: Arc<dyn PlaybackEngine>, config: &PlaybackConfig) -> Self {
        Self::start_with(engine, config, |controller| controller)
    }

    /// Start a session, letting `customize` adjust the controller first
    /// (e.g. to seed its random source).
    pub fn start_with(
        engine: Arc<dyn PlaybackEngine>,
        config: &PlaybackConfig,
        customize: impl FnOnce(TransportController) -> TransportController,
    ) -> Self {
        let engine = EngineHandle::new(engine);
        let build = |samples: mpsc::UnboundedSender<ClockSample>| {
            customize(TransportController::new(
                engine.clone(),
                config,
                Property::new(PlaybackState::default()),
                Property::new(QueueSummary::default()),
                samples,
            ))
        };
        Self::spawn(engine.clone(), build)
    }

    fn spawn(
        engine: EngineHandle,
        controller: impl FnOnce(mpsc::UnboundedSender<ClockSample>) -> TransportController,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (sample_tx, sample_rx) = mpsc::unbounded_channel();

        let controller = controller(sample_tx);
        let state = controller.state_property();
        let summary = controller.summary_property();

        engine.subscribe(event_tx);
        let actor = tokio::spawn(Self::run(controller, command_rx, event_rx, sample_rx));
        engine.connect();

        info!("Playback session started");
        Self {
            commands: command_tx,
            state,
            summary,
            engine,
            actor: Mutex::new(Some(actor)),
        }
    }

    async fn run(
        mut controller: TransportController,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<EngineEvent>,
        mut samples: mpsc::UnboundedReceiver<ClockSample>,
    ) {
        loop {
            tokio::select! {
                biased;

                Some(event) = events.recv() => controller.handle_engine_event(event),

                Some(sample) = samples.recv() => controller.handle_clock_sample(sample),

                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(Command::Settled(done)) => {
                        while let Ok(event) = events.try_recv() {
                            controller.handle_engine_event(event);
                        }
                        let _ = done.send(());
                    }
                    Some(command) => Self::apply(&mut controller, command),
                },
            }
        }

        controller.shutdown();
        debug!("Playback session actor stopped");
    }

    fn apply(controller: &mut TransportController, command: Command) {
        match command {
            Command::SetQueue {
                tracks,
                start_index,
                shuffle,
            } => controller.set_queue(tracks, start_index, shuffle),
            Command::PlayMedia { track, context } => controller.play_media(track, context),
            Command::PlayCollection { tracks, shuffle } => {
                controller.play_collection(tracks, shuffle);
            }
            Command::TogglePlayPause => controller.toggle_play_pause(),
            Command::Play => controller.play(),
            Command::Pause => controller.pause(),
            Command::Next => controller.next(),
            Command::Previous => controller.previous(),
            Command::SeekTo(position_ms) => controller.seek_to(position_ms),
            Command::ToggleShuffle => controller.toggle_shuffle(),
            Command::ToggleRepeat => controller.toggle_repeat(),
            Command::Reconnect => controller.reconnect(),
            Command::Settled(_) | Command::Shutdown => {}
        }
    }

    fn send(&self, command: Command) -> Result<(), PlaybackError> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Replace the queue and play the track at `start_index`.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn set_queue(
        &self,
        tracks: Vec<Track>,
        start_index: usize,
        shuffle: bool,
    ) -> Result<(), PlaybackError> {
        self.send(Command::SetQueue {
            tracks,
            start_index,
            shuffle,
        })
    }

    /// Play `track` the way its kind requires, within `context` for audio.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn play_media(&self, track: Track, context: Vec<Track>) -> Result<(), PlaybackError> {
        self.send(Command::PlayMedia { track, context })
    }

    /// Play a whole collection, from a random track when shuffling.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn play_collection(&self, tracks: Vec<Track>, shuffle: bool) -> Result<(), PlaybackError> {
        self.send(Command::PlayCollection { tracks, shuffle })
    }

    /// Toggle between playing and paused.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn toggle_play_pause(&self) -> Result<(), PlaybackError> {
        self.send(Command::TogglePlayPause)
    }

    /// Resume playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn play(&self) -> Result<(), PlaybackError> {
        self.send(Command::Play)
    }

    /// Pause playback.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(Command::Pause)
    }

    /// Skip to the next track.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn next(&self) -> Result<(), PlaybackError> {
        self.send(Command::Next)
    }

    /// Skip to the previous track or restart the current one.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn previous(&self) -> Result<(), PlaybackError> {
        self.send(Command::Previous)
    }

    /// Seek within the current track.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn seek_to(&self, position_ms: i64) -> Result<(), PlaybackError> {
        self.send(Command::SeekTo(position_ms))
    }

    /// Flip shuffle.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn toggle_shuffle(&self) -> Result<(), PlaybackError> {
        self.send(Command::ToggleShuffle)
    }

    /// Cycle the repeat policy.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn toggle_repeat(&self) -> Result<(), PlaybackError> {
        self.send(Command::ToggleRepeat)
    }

    /// Retry the engine connection after it failed or was lost.
    ///
    /// Playback does not resume on its own once connected.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` after [`dispose`](Self::dispose)
    pub fn reconnect(&self) -> Result<(), PlaybackError> {
        self.send(Command::Reconnect)
    }

    /// Wait until every command issued before this call has been processed,
    /// along with the engine events already delivered.
    ///
    /// # Errors
    /// Returns `PlaybackError::SessionClosed` if the session stops first
    pub async fn settled(&self) -> Result<(), PlaybackError> {
        let (done, wait) = oneshot::channel();
        self.send(Command::Settled(done))?;
        wait.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Snapshot of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    /// Stream of playback states, starting with the current one.
    pub fn watch_state(&self) -> impl Stream<Item = PlaybackState> + Send + use<> {
        self.state.watch()
    }

    /// Snapshot of the queue summary.
    pub fn queue_summary(&self) -> QueueSummary {
        self.summary.get()
    }

    /// Stream of queue summaries, starting with the current one.
    pub fn watch_queue(&self) -> impl Stream<Item = QueueSummary> + Send + use<> {
        self.summary.watch()
    }

    /// Whether engine commands currently have an effect.
    pub fn engine_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// Engine connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.engine.state()
    }

    /// Stream of the "engine ready" flag, starting with the current value.
    pub fn ready_monitored(&self) -> impl Stream<Item = bool> + Send + use<> {
        self.engine.ready_monitored()
    }

    /// Stop the session: cancel the clock, unsubscribe from and release the
    /// engine. Commands queued before this call are processed first.
    ///
    /// Safe from any state, including while the engine is still connecting.
    /// Idempotent.
    #[instrument(skip(self))]
    pub async fn dispose(&self) {
        let Some(actor) = self.actor.lock().await.take() else {
            return;
        };

        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = actor.await {
            debug!("Playback session actor ended abnormally: {e}");
            self.engine.unsubscribe();
            self.engine.dispose();
        }
        info!("Playback session disposed");
    }
}
