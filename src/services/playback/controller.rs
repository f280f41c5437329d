use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{
    Advance, ClockSample, Direction, EngineEvent, EngineHandle, PlaybackQueue, PlaybackState,
    PositionClock, QueueSummary, RepeatMode, TransportState,
};
use crate::{
    config::{EndOfQueue, PlaybackConfig},
    services::{
        common::Property,
        library::{MediaKind, Track},
    },
};

/// Translates user intents and engine events into queue transitions and
/// engine commands.
///
/// Owned by a single writer; every method runs to completion without
/// waiting on the engine.
pub struct TransportController {
    queue: PlaybackQueue,
    transport: TransportState,
    single_item: bool,
    track_generation: u64,
    synced_generation: Option<u64>,
    state: Property<PlaybackState>,
    summary: Property<QueueSummary>,
    engine: EngineHandle,
    clock: PositionClock,
    generation: Arc<AtomicU64>,
    samples: mpsc::UnboundedSender<ClockSample>,
    end_of_queue: EndOfQueue,
    rng: StdRng,
}

impl TransportController {
    /// Create an idle controller publishing into `state` and `summary`.
    pub fn new(
        engine: EngineHandle,
        config: &PlaybackConfig,
        state: Property<PlaybackState>,
        summary: Property<QueueSummary>,
        samples: mpsc::UnboundedSender<ClockSample>,
    ) -> Self {
        Self {
            queue: PlaybackQueue::new(config.restart_threshold_ms),
            transport: TransportState::Idle,
            single_item: false,
            track_generation: 0,
            synced_generation: None,
            state,
            summary,
            engine,
            clock: PositionClock::new(config.position_interval()),
            generation: Arc::new(AtomicU64::new(0)),
            samples,
            end_of_queue: config.end_of_queue,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use `rng` for every shuffle decision.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Shared handle to the published playback state.
    pub fn state_property(&self) -> Property<PlaybackState> {
        self.state.clone()
    }

    /// Shared handle to the published queue summary.
    pub fn summary_property(&self) -> Property<QueueSummary> {
        self.summary.clone()
    }

    /// Replace the queue and start playing the track at `start_index`.
    ///
    /// An empty list or out-of-range index leaves everything unchanged.
    pub fn set_queue(&mut self, tracks: Vec<Track>, start_index: usize, shuffle: bool) {
        match self
            .queue
            .set_with_rng(tracks, start_index, shuffle, &mut self.rng)
        {
            Ok(track) => {
                let track = track.clone();
                self.single_item = false;
                self.load(track);
            }
            Err(e) => debug!("Ignoring set_queue: {e}"),
        }
        self.publish_summary();
    }

    /// Start playback of `track` according to its kind.
    ///
    /// Audio plays within `context`; video plays on its own and clears the
    /// queue; images are not playable.
    pub fn play_media(&mut self, track: Track, context: Vec<Track>) {
        match track.kind {
            MediaKind::Video => self.play_single(track),
            MediaKind::Image => debug!("Ignoring play_media for image {}", track.id),
            MediaKind::Audio => match context.iter().position(|t| t.id == track.id) {
                Some(index) => self.set_queue(context, index, false),
                None => debug!("Track {} not in its context, ignoring play_media", track.id),
            },
        }
    }

    /// Play a whole collection, from a random track when shuffling.
    pub fn play_collection(&mut self, tracks: Vec<Track>, shuffle: bool) {
        if tracks.is_empty() {
            debug!("Ignoring play_collection for empty collection");
            return;
        }

        let start_index = if shuffle {
            self.rng.gen_range(0..tracks.len())
        } else {
            0
        };
        self.set_queue(tracks, start_index, shuffle);
    }

    /// Pause when playing, otherwise resume.
    pub fn toggle_play_pause(&mut self) {
        match self.transport {
            TransportState::Idle => debug!("Nothing loaded, ignoring toggle_play_pause"),
            TransportState::Playing => self.pause(),
            TransportState::Loaded | TransportState::Paused => self.play(),
        }
    }

    /// Resume playback of the current track.
    ///
    /// After a reconnect the engine holds no media; the current track is
    /// loaded again at the last known position.
    pub fn play(&mut self) {
        if self.transport == TransportState::Idle {
            debug!("Nothing loaded, ignoring play");
            return;
        }

        if self.engine_needs_resync() {
            self.resync();
        } else {
            self.engine.play();
        }
        self.transport = TransportState::Playing;
        self.publish_summary();
    }

    /// Pause playback.
    pub fn pause(&mut self) {
        if self.transport == TransportState::Idle {
            debug!("Nothing loaded, ignoring pause");
            return;
        }

        self.engine.pause();
        self.transport = TransportState::Paused;
        self.publish_summary();
    }

    /// Skip to the next track, wrapping after the last one.
    pub fn next(&mut self) {
        self.skip(Direction::Next);
    }

    /// Skip to the previous track, or restart the current one past the
    /// restart threshold.
    pub fn previous(&mut self) {
        self.skip(Direction::Previous);
    }

    /// Seek within the current track.
    ///
    /// The target is clamped to the known duration and published before the
    /// engine confirms it.
    pub fn seek_to(&mut self, position_ms: i64) {
        let state = self.state.get();
        if state.current_track.is_none() {
            debug!("Nothing loaded, ignoring seek");
            return;
        }

        let mut target = u64::try_from(position_ms).unwrap_or(0);
        if state.duration_ms > 0 {
            target = target.min(state.duration_ms);
        }

        self.engine.seek(target);
        self.state.update(|state| {
            let changed = state.position_ms != target;
            state.position_ms = target;
            changed
        });
    }

    /// Flip shuffle without interrupting the current track.
    pub fn toggle_shuffle(&mut self) {
        match self.queue.toggle_shuffle_with_rng(&mut self.rng) {
            Ok(enabled) => debug!("Shuffle {}", if enabled { "on" } else { "off" }),
            Err(e) => debug!("Ignoring toggle_shuffle: {e}"),
        }
        self.publish_summary();
    }

    /// Cycle the repeat policy Off → All → One → Off.
    pub fn toggle_repeat(&mut self) {
        let mode = self.queue.cycle_repeat();
        debug!("Repeat {mode:?}");
        self.publish_summary();
    }

    /// React to an engine event.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Connected => {
                self.synced_generation = None;
                self.engine.set_auto_advance_hint(false);
            }
            EngineEvent::ConnectionFailed(reason) => {
                debug!("Engine unavailable ({reason}), commands will be dropped");
            }
            EngineEvent::StateChanged { playing } => self.on_state_changed(playing),
            EngineEvent::MediaEnded => self.auto_advance(),
            EngineEvent::MediaReady { duration_ms } => {
                self.state.update(|state| {
                    let changed = state.current_track.is_some() && state.duration_ms != duration_ms;
                    if changed {
                        state.duration_ms = duration_ms;
                    }
                    changed
                });
            }
            EngineEvent::ShuffleChanged(enabled) => {
                debug!("Ignoring engine shuffle flag {enabled}");
            }
        }
    }

    /// Publish a clock sample unless it belongs to a replaced track or an
    /// earlier sampling run.
    pub fn handle_clock_sample(&mut self, sample: ClockSample) {
        if !self.clock.is_running() || sample.generation != self.generation.load(Ordering::SeqCst)
        {
            return;
        }

        self.state.update(|state| {
            let duration_ms = sample
                .duration_ms
                .filter(|&duration| duration > 0)
                .unwrap_or(state.duration_ms);
            let changed = state.position_ms != sample.position_ms || state.duration_ms != duration_ms;
            state.position_ms = sample.position_ms;
            state.duration_ms = duration_ms;
            changed
        });
    }

    /// Retry the engine connection. Playback is not resumed.
    pub fn reconnect(&mut self) {
        self.engine.connect();
    }

    /// Stop sampling, detach from the engine and release it, in that order.
    pub fn shutdown(&mut self) {
        self.clock.stop();
        self.engine.unsubscribe();
        self.engine.dispose();
        info!("Transport controller shut down");
    }

    fn play_single(&mut self, track: Track) {
        self.queue.clear();
        self.single_item = true;
        self.load(track);
        self.publish_summary();
    }

    fn skip(&mut self, direction: Direction) {
        let position_ms = self
            .engine
            .position_ms()
            .unwrap_or_else(|| self.state.get().position_ms);

        match self.queue.advance(direction, position_ms) {
            Ok(Advance::Moved(_)) => {
                if let Some(track) = self.queue.current().cloned() {
                    self.load(track);
                }
            }
            Ok(Advance::Restart) => self.restart(),
            Err(e) => debug!("Ignoring {direction:?}: {e}"),
        }
        self.publish_summary();
    }

    fn restart(&mut self) {
        self.engine.seek(0);
        if self.transport != TransportState::Playing {
            self.engine.play();
        }
        self.transport = TransportState::Playing;
        self.state.update(|state| {
            let changed = state.position_ms != 0;
            state.position_ms = 0;
            changed
        });
    }

    fn auto_advance(&mut self) {
        if self.queue.is_empty() {
            if self.single_item {
                debug!("Single item ended");
                self.stop();
            }
            return;
        }

        match self.queue.repeat_mode() {
            RepeatMode::One => {
                if let Some(track) = self.queue.current().cloned() {
                    self.load(track);
                }
            }
            RepeatMode::Off if self.queue.is_last() && self.end_of_queue == EndOfQueue::Stop => {
                debug!("End of queue reached, stopping");
                self.stop();
            }
            RepeatMode::All | RepeatMode::Off => match self.queue.advance(Direction::Next, 0) {
                Ok(_) => {
                    if let Some(track) = self.queue.current().cloned() {
                        self.load(track);
                    }
                }
                Err(e) => debug!("Auto-advance skipped: {e}"),
            },
        }
        self.publish_summary();
    }

    fn stop(&mut self) {
        self.transport = TransportState::Paused;
        self.publish_summary();
    }

    fn on_state_changed(&mut self, playing: bool) {
        self.state.update(|state| {
            let changed = state.is_playing != playing;
            state.is_playing = playing;
            changed
        });

        if playing {
            self.retire_samples();
            self.clock.start(
                self.engine.clone(),
                Arc::clone(&self.generation),
                self.samples.clone(),
            );
        } else {
            self.clock.stop();
            self.retire_samples();
        }

        self.transport = match (self.transport, playing) {
            (TransportState::Idle, _) => TransportState::Idle,
            (_, true) => TransportState::Playing,
            (TransportState::Playing, false) => TransportState::Paused,
            (other, false) => other,
        };
        self.publish_summary();
    }

    fn load(&mut self, track: Track) {
        self.state.update(|state| {
            state.current_track = Some(track.clone());
            state.position_ms = 0;
            state.duration_ms = track.duration_ms;
            true
        });

        // Samples read while the engine still held the old track carry the
        // previous generation.
        self.engine.load_and_play(&track);
        self.retire_samples();
        self.track_generation += 1;

        if self.engine.is_ready() {
            self.synced_generation = Some(self.track_generation);
            self.transport = TransportState::Playing;
        } else {
            self.synced_generation = None;
            self.transport = TransportState::Loaded;
        }
    }

    fn engine_needs_resync(&self) -> bool {
        self.engine.is_ready()
            && self.synced_generation != Some(self.track_generation)
    }

    fn resync(&mut self) {
        let PlaybackState {
            current_track,
            position_ms,
            ..
        } = self.state.get();
        let Some(track) = current_track else {
            return;
        };

        debug!("Reloading {} into the engine at {position_ms} ms", track.id);
        self.engine.load_and_play(&track);
        if position_ms > 0 {
            self.engine.seek(position_ms);
        }
        self.retire_samples();
        self.synced_generation = Some(self.track_generation);
    }

    /// Invalidate every sample taken so far.
    fn retire_samples(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn sample_generation(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }

    fn publish_summary(&self) {
        let current_track = if self.single_item {
            self.state.get().current_track
        } else {
            self.queue.current().cloned()
        };

        self.summary.set(QueueSummary {
            current_track,
            current_index: self.queue.current_index(),
            play_order: self.queue.play_order().map(|track| track.id).collect(),
            has_next: self.queue.has_next(),
            has_previous: self.queue.has_previous(),
            shuffle: self.queue.shuffle_enabled(),
            repeat: self.queue.repeat_mode(),
            transport: self.transport,
        });
    }
}
