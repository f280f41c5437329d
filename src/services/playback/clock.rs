use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

use super::EngineHandle;

/// Position reading taken by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    /// Track generation current when the sample was taken
    pub generation: u64,

    /// Engine position in milliseconds
    pub position_ms: u64,

    /// Engine duration, if known
    pub duration_ms: Option<u64>,
}

/// Periodic sampler of engine position.
///
/// At most one sampling loop runs at a time. Samples are tagged with the
/// generation read before the engine is queried; a reading is discarded if
/// the generation moved while the engine was being queried.
pub struct PositionClock {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl PositionClock {
    /// Create a stopped clock sampling every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Start sampling, replacing any loop already running.
    pub fn start(
        &mut self,
        engine: EngineHandle,
        generation: Arc<AtomicU64>,
        samples: mpsc::UnboundedSender<ClockSample>,
    ) {
        self.stop();

        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let tagged = generation.load(Ordering::SeqCst);
                let Some(position_ms) = engine.position_ms() else {
                    continue;
                };
                let duration_ms = engine.duration_ms();

                if generation.load(Ordering::SeqCst) != tagged {
                    debug!("Generation changed while sampling, dropping sample");
                    continue;
                }

                let sample = ClockSample {
                    generation: tagged,
                    position_ms,
                    duration_ms,
                };
                if samples.send(sample).is_err() {
                    debug!("Sample receiver closed, stopping position clock");
                    return;
                }
            }
        }));
    }

    /// Stop sampling. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a sampling loop is active.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PositionClock {
    fn drop(&mut self) {
        self.stop();
    }
}
