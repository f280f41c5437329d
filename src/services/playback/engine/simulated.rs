use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, instrument};

use super::{EngineConnection, EngineEvent, EngineEventSink, PlaybackEngine, lock};
use crate::services::{library::Track, playback::EngineError};

/// Engine that "plays" tracks by advancing a clock.
///
/// Position follows tokio time, so tests can drive it with a paused clock.
/// Media ends once the position reaches the track's catalog duration;
/// tracks with zero duration never end.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    connect_delay: Duration,
    failure: Option<String>,
    tick: Duration,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(50),
            failure: None,
            tick: Duration::from_millis(100),
        }
    }
}

impl SimulatedEngine {
    /// Engine that connects after a short delay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long a connection attempt takes.
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Make every connection attempt fail with `reason`.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Set how often the engine checks for the end of media.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }
}

#[async_trait]
impl PlaybackEngine for SimulatedEngine {
    #[instrument(skip(self, events))]
    async fn connect(
        &self,
        events: EngineEventSink,
    ) -> Result<Arc<dyn EngineConnection>, EngineError> {
        tokio::time::sleep(self.connect_delay).await;

        if let Some(reason) = &self.failure {
            return Err(EngineError::ConnectionFailed(reason.clone()));
        }

        Ok(Arc::new(SimulatedConnection::start(events, self.tick)))
    }
}

#[derive(Debug, Default)]
struct Deck {
    track: Option<Track>,
    playing: bool,
    anchor: Option<Instant>,
    offset_ms: u64,
    duration_ms: u64,
    released: bool,
}

impl Deck {
    fn position_ms(&self) -> u64 {
        let running = self
            .anchor
            .map(|anchor| anchor.elapsed().as_millis() as u64)
            .unwrap_or(0);
        let position = self.offset_ms + running;

        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    fn halt(&mut self) {
        self.offset_ms = self.position_ms();
        self.anchor = None;
        self.playing = false;
    }

    fn resume(&mut self) {
        self.anchor = Some(Instant::now());
        self.playing = true;
    }

    fn reached_end(&self) -> bool {
        self.playing && self.duration_ms > 0 && self.position_ms() >= self.duration_ms
    }
}

struct SimulatedConnection {
    deck: Arc<Mutex<Deck>>,
    events: EngineEventSink,
    ticker: JoinHandle<()>,
}

impl SimulatedConnection {
    fn start(events: EngineEventSink, tick: Duration) -> Self {
        let deck = Arc::new(Mutex::new(Deck::default()));

        let ticker = tokio::spawn(Self::watch_for_end(
            Arc::clone(&deck),
            events.clone(),
            tick,
        ));

        Self {
            deck,
            events,
            ticker,
        }
    }

    async fn watch_for_end(deck: Arc<Mutex<Deck>>, events: EngineEventSink, tick: Duration) {
        let mut interval = tokio::time::interval(tick);

        loop {
            interval.tick().await;

            let ended = {
                let mut deck = lock(&deck);
                if deck.reached_end() {
                    deck.halt();
                    true
                } else {
                    false
                }
            };

            if ended {
                debug!("Simulated media ended");
                events.emit(EngineEvent::StateChanged { playing: false });
                events.emit(EngineEvent::MediaEnded);
            }
        }
    }

    fn deck(&self) -> Option<std::sync::MutexGuard<'_, Deck>> {
        let deck = lock(&self.deck);
        (!deck.released).then_some(deck)
    }
}

impl EngineConnection for SimulatedConnection {
    fn load_and_play(&self, track: &Track) {
        let Some(mut deck) = self.deck() else {
            return;
        };

        deck.track = Some(track.clone());
        deck.offset_ms = 0;
        deck.duration_ms = track.duration_ms;
        deck.resume();
        drop(deck);

        self.events.emit(EngineEvent::MediaReady {
            duration_ms: track.duration_ms,
        });
        self.events.emit(EngineEvent::StateChanged { playing: true });
    }

    fn play(&self) {
        let Some(mut deck) = self.deck() else {
            return;
        };
        if deck.track.is_none() || deck.playing {
            return;
        }

        if deck.duration_ms > 0 && deck.offset_ms >= deck.duration_ms {
            deck.offset_ms = 0;
        }
        deck.resume();
        drop(deck);

        self.events.emit(EngineEvent::StateChanged { playing: true });
    }

    fn pause(&self) {
        let Some(mut deck) = self.deck() else {
            return;
        };
        if !deck.playing {
            return;
        }

        deck.halt();
        drop(deck);

        self.events.emit(EngineEvent::StateChanged { playing: false });
    }

    fn seek(&self, position_ms: u64) {
        let Some(mut deck) = self.deck() else {
            return;
        };

        deck.offset_ms = if deck.duration_ms > 0 {
            position_ms.min(deck.duration_ms)
        } else {
            position_ms
        };
        if deck.playing {
            deck.anchor = Some(Instant::now());
        }
    }

    fn position_ms(&self) -> u64 {
        lock(&self.deck).position_ms()
    }

    fn duration_ms(&self) -> Option<u64> {
        let deck = lock(&self.deck);
        (deck.track.is_some() && deck.duration_ms > 0).then_some(deck.duration_ms)
    }

    fn release(&self) {
        self.ticker.abort();

        let mut deck = lock(&self.deck);
        deck.halt();
        deck.released = true;
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
