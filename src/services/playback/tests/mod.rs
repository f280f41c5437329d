//! Unit tests for the playback module
//!
//! Queue transitions use seeded random sources so shuffles are repeatable.
//! Clock and engine tests run on a paused tokio clock.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;

use crate::{
    config::PlaybackConfig,
    services::{
        common::Property,
        library::{MediaKind, Track, TrackId},
        playback::{
            Advance, ClockSample, ConnectionState, Direction, EngineConnection, EngineError,
            EngineEvent, EngineEventSink, EngineHandle, PlaybackEngine, PlaybackQueue,
            PlaybackState, PositionClock, QueueError, QueueSummary, RepeatMode, SimulatedEngine,
            TransportController, TransportState, shuffled_queue_with,
        },
    },
};

fn track(id: u64) -> Track {
    Track::new(
        TrackId(id),
        format!("file:///music/{id}.mp3"),
        format!("Track {id}"),
        MediaKind::Audio,
    )
    .with_duration_ms(180_000)
}

fn tracks(ids: &[u64]) -> Vec<Track> {
    ids.iter().copied().map(track).collect()
}

fn current_id(queue: &PlaybackQueue) -> Option<u64> {
    queue.current().map(|t| t.id.0)
}

fn order_ids(queue: &PlaybackQueue) -> Vec<u64> {
    queue.play_order().map(|t| t.id.0).collect()
}

fn counts(ids: &[u64]) -> HashMap<u64, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(*id).or_default() += 1;
    }
    counts
}

mod queue {
    use super::*;

    #[test]
    fn shuffled_queue_keeps_pivot_first_and_every_other_track() {
        let input = tracks(&[1, 2, 3, 4, 5, 6, 2]);

        for seed in 0..64 {
            for pivot in 0..input.len() {
                let mut rng = StdRng::seed_from_u64(seed);
                let shuffled = shuffled_queue_with(&input, pivot, &mut rng);

                assert_eq!(shuffled[0], input[pivot]);

                let mut expected: Vec<u64> = input.iter().map(|t| t.id.0).collect();
                expected.remove(pivot);
                let rest: Vec<u64> = shuffled[1..].iter().map(|t| t.id.0).collect();
                assert_eq!(counts(&rest), counts(&expected));
            }
        }
    }

    #[test]
    fn shuffled_queue_with_out_of_range_pivot_shuffles_everything() {
        let input = tracks(&[1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(7);

        let shuffled = shuffled_queue_with(&input, 10, &mut rng);
        let ids: Vec<u64> = shuffled.iter().map(|t| t.id.0).collect();
        assert_eq!(counts(&ids), counts(&[1, 2, 3]));
    }

    #[test]
    fn shuffled_queue_of_single_track() {
        let input = tracks(&[9]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffled_queue_with(&input, 0, &mut rng), input);
    }

    #[test]
    fn set_rejects_empty_and_out_of_range_leaving_queue_unchanged() {
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[1, 2, 3]), 1, false).unwrap();

        assert_eq!(queue.set(Vec::new(), 0, false), Err(QueueError::Empty));
        assert_eq!(
            queue.set(tracks(&[7, 8]), 2, false),
            Err(QueueError::IndexOutOfBounds { index: 2, len: 2 })
        );

        assert_eq!(current_id(&queue), Some(2));
        assert_eq!(order_ids(&queue), vec![1, 2, 3]);
    }

    #[test]
    fn set_without_shuffle_plays_from_start_index() {
        let mut queue = PlaybackQueue::default();
        let current = queue.set(tracks(&[1, 2, 3]), 2, false).unwrap();

        assert_eq!(current.id, TrackId(3));
        assert_eq!(queue.current_index(), Some(2));
        assert!(!queue.shuffle_enabled());
    }

    #[test]
    fn set_with_shuffle_puts_start_track_first() {
        let mut queue = PlaybackQueue::default();
        let mut rng = StdRng::seed_from_u64(42);

        let current = queue
            .set_with_rng(tracks(&[1, 2, 3, 4, 5]), 3, true, &mut rng)
            .unwrap();

        assert_eq!(current.id, TrackId(4));
        assert_eq!(queue.current_index(), Some(0));
        assert!(queue.shuffle_enabled());
        assert_eq!(
            queue.base_order().iter().map(|t| t.id.0).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn toggle_shuffle_round_trip_restores_current_track_and_index() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut queue = PlaybackQueue::default();
            queue.set(tracks(&[1, 2, 3, 4, 5]), 3, false).unwrap();

            assert_eq!(queue.toggle_shuffle_with_rng(&mut rng), Ok(true));
            assert_eq!(current_id(&queue), Some(4));
            assert_eq!(queue.current_index(), Some(0));

            assert_eq!(queue.toggle_shuffle_with_rng(&mut rng), Ok(false));
            assert_eq!(current_id(&queue), Some(4));
            assert_eq!(queue.current_index(), Some(3));
            assert_eq!(order_ids(&queue), vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn toggle_shuffle_tracks_position_not_id_with_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[5, 6, 5, 7]), 2, false).unwrap();

        queue.toggle_shuffle_with_rng(&mut rng).unwrap();
        queue.toggle_shuffle_with_rng(&mut rng).unwrap();

        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[1, 2, 3]), 2, false).unwrap();

        assert_eq!(queue.advance(Direction::Next, 0), Ok(Advance::Moved(0)));
        assert_eq!(current_id(&queue), Some(1));
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[1, 2, 3]), 0, false).unwrap();

        assert_eq!(
            queue.advance(Direction::Previous, 1000),
            Ok(Advance::Moved(2))
        );
        assert_eq!(current_id(&queue), Some(3));
    }

    #[test]
    fn previous_past_threshold_restarts_instead_of_moving() {
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[1, 2, 3]), 1, false).unwrap();

        assert_eq!(queue.advance(Direction::Previous, 5000), Ok(Advance::Restart));
        assert_eq!(queue.current_index(), Some(1));

        assert_eq!(queue.advance(Direction::Previous, 3000), Ok(Advance::Moved(0)));
    }

    #[test]
    fn restart_threshold_is_configurable() {
        let mut queue = PlaybackQueue::new(10_000);
        queue.set(tracks(&[1, 2]), 1, false).unwrap();

        assert_eq!(queue.advance(Direction::Previous, 5000), Ok(Advance::Moved(0)));
    }

    #[test]
    fn empty_queue_operations_are_rejected_without_side_effects() {
        let mut queue = PlaybackQueue::default();

        assert!(!queue.has_next());
        assert!(!queue.has_previous());
        assert_eq!(queue.advance(Direction::Next, 0), Err(QueueError::Empty));
        assert_eq!(queue.advance(Direction::Previous, 0), Err(QueueError::Empty));
        assert_eq!(queue.toggle_shuffle(), Err(QueueError::Empty));
        assert!(!queue.shuffle_enabled());
        assert_eq!(queue.current(), None);
    }

    #[test]
    fn cycle_repeat_goes_off_all_one_off() {
        let mut queue = PlaybackQueue::default();

        assert_eq!(queue.cycle_repeat(), RepeatMode::All);
        assert_eq!(queue.cycle_repeat(), RepeatMode::One);
        assert_eq!(queue.cycle_repeat(), RepeatMode::Off);
    }

    #[test]
    fn clear_keeps_shuffle_and_repeat_settings() {
        let mut queue = PlaybackQueue::default();
        queue.set(tracks(&[1, 2]), 0, true).unwrap();
        queue.set_repeat_mode(RepeatMode::One);

        queue.clear();

        assert!(queue.is_empty());
        assert!(queue.shuffle_enabled());
        assert_eq!(queue.repeat_mode(), RepeatMode::One);
    }

    #[test]
    fn four_track_scenario() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut queue = PlaybackQueue::default();

        queue.set(tracks(&[1, 2, 3, 4]), 2, false).unwrap();
        assert_eq!(current_id(&queue), Some(3));
        assert!(queue.has_next());
        assert!(queue.has_previous());

        queue.advance(Direction::Next, 0).unwrap();
        assert_eq!(current_id(&queue), Some(4));
        assert!(queue.is_last());

        queue.advance(Direction::Next, 0).unwrap();
        assert_eq!(current_id(&queue), Some(1));

        queue.toggle_shuffle_with_rng(&mut rng).unwrap();
        assert_eq!(current_id(&queue), Some(1));

        let order = order_ids(&queue);
        assert_eq!(order[0], 1);
        assert_eq!(counts(&order[1..]), counts(&[2, 3, 4]));
    }
}

struct FixedConnection {
    position_ms: AtomicU64,
}

impl EngineConnection for FixedConnection {
    fn load_and_play(&self, _track: &Track) {}
    fn play(&self) {}
    fn pause(&self) {}
    fn seek(&self, position_ms: u64) {
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }
    fn position_ms(&self) -> u64 {
        self.position_ms.load(Ordering::SeqCst)
    }
    fn duration_ms(&self) -> Option<u64> {
        Some(60_000)
    }
    fn release(&self) {}
}

struct FixedEngine;

#[async_trait]
impl PlaybackEngine for FixedEngine {
    async fn connect(
        &self,
        _events: EngineEventSink,
    ) -> Result<Arc<dyn EngineConnection>, EngineError> {
        Ok(Arc::new(FixedConnection {
            position_ms: AtomicU64::new(1234),
        }))
    }
}

/// Engine handing out one shared connection the test can inspect.
struct SharedEngine(Arc<dyn EngineConnection>);

#[async_trait]
impl PlaybackEngine for SharedEngine {
    async fn connect(
        &self,
        _events: EngineEventSink,
    ) -> Result<Arc<dyn EngineConnection>, EngineError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Connection that moves the generation on every position query, as a
/// track change racing the clock would.
struct ChurningConnection {
    generation: Arc<AtomicU64>,
}

impl EngineConnection for ChurningConnection {
    fn load_and_play(&self, _track: &Track) {}
    fn play(&self) {}
    fn pause(&self) {}
    fn seek(&self, _position_ms: u64) {}
    fn position_ms(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst);
        42
    }
    fn duration_ms(&self) -> Option<u64> {
        None
    }
    fn release(&self) {}
}

/// Connection recording what a clock tick would read at the moment a new
/// track reaches the engine.
#[derive(Default)]
struct LoadSnapshotConnection {
    position_ms: AtomicU64,
    generation: Mutex<Option<Arc<AtomicU64>>>,
    snapshots: Mutex<Vec<ClockSample>>,
}

impl EngineConnection for LoadSnapshotConnection {
    fn load_and_play(&self, _track: &Track) {
        if let Some(generation) = self.generation.lock().unwrap().as_ref() {
            self.snapshots.lock().unwrap().push(ClockSample {
                generation: generation.load(Ordering::SeqCst),
                position_ms: self.position_ms.load(Ordering::SeqCst),
                duration_ms: None,
            });
        }
        self.position_ms.store(0, Ordering::SeqCst);
    }
    fn play(&self) {}
    fn pause(&self) {}
    fn seek(&self, position_ms: u64) {
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }
    fn position_ms(&self) -> u64 {
        self.position_ms.load(Ordering::SeqCst)
    }
    fn duration_ms(&self) -> Option<u64> {
        Some(180_000)
    }
    fn release(&self) {}
}

async fn ready_handle(backend: Arc<dyn PlaybackEngine>) -> EngineHandle {
    let handle = EngineHandle::new(backend);
    handle.connect();

    let mut ready = Box::pin(handle.ready_monitored());
    while let Some(flag) = ready.next().await {
        if flag {
            break;
        }
    }
    handle
}

mod clock {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn samples_carry_generation_and_engine_position() {
        let engine = ready_handle(Arc::new(FixedEngine)).await;
        let generation = Arc::new(AtomicU64::new(5));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut clock = PositionClock::new(Duration::from_millis(500));
        clock.start(engine, Arc::clone(&generation), tx);
        assert!(clock.is_running());

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first,
            ClockSample {
                generation: 5,
                position_ms: 1234,
                duration_ms: Some(60_000),
            }
        );

        generation.store(6, Ordering::SeqCst);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.generation, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_sampling() {
        let engine = ready_handle(Arc::new(FixedEngine)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut clock = PositionClock::new(Duration::from_millis(500));
        clock.start(engine, Arc::new(AtomicU64::new(0)), tx);
        rx.recv().await.unwrap();

        clock.stop();
        assert!(!clock.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_keeps_a_single_loop() {
        let engine = ready_handle(Arc::new(FixedEngine)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut clock = PositionClock::new(Duration::from_millis(500));
        for _ in 0..3 {
            clock.start(engine.clone(), Arc::new(AtomicU64::new(0)), tx.clone());
        }
        drop(tx);

        tokio::time::sleep(Duration::from_millis(1250)).await;
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn readings_taken_across_a_generation_change_are_dropped() {
        let generation = Arc::new(AtomicU64::new(0));
        let connection = ChurningConnection {
            generation: Arc::clone(&generation),
        };
        let engine = ready_handle(Arc::new(SharedEngine(Arc::new(connection)))).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut clock = PositionClock::new(Duration::from_millis(500));
        clock.start(engine, Arc::clone(&generation), tx);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
        assert!(generation.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn no_samples_while_engine_disconnected() {
        let engine = EngineHandle::new(Arc::new(FixedEngine));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut clock = PositionClock::new(Duration::from_millis(500));
        clock.start(engine, Arc::new(AtomicU64::new(0)), tx);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }
}

mod engine {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn commands_before_connect_are_dropped() {
        let handle = EngineHandle::new(Arc::new(FixedEngine));

        handle.seek(10);
        assert_eq!(handle.state(), ConnectionState::Disconnected);
        assert_eq!(handle.position_ms(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_reports_to_listener_and_is_single_flight() {
        let handle = EngineHandle::new(Arc::new(SimulatedEngine::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.subscribe(tx);

        handle.connect();
        handle.connect();
        assert_eq!(handle.state(), ConnectionState::Connecting);

        assert_eq!(rx.recv().await, Some(EngineEvent::Connected));
        assert!(handle.is_ready());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connection_is_reported_and_not_retried() {
        let handle = EngineHandle::new(Arc::new(SimulatedEngine::new().failing("no engine")));
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.subscribe(tx);

        handle.connect();

        match rx.recv().await {
            Some(EngineEvent::ConnectionFailed(reason)) => assert!(reason.contains("no engine")),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(handle.state(), ConnectionState::Disconnected);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_mid_connect_never_becomes_ready() {
        let handle = EngineHandle::new(Arc::new(
            SimulatedEngine::new().with_connect_delay(Duration::from_secs(1)),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.subscribe(tx);

        handle.connect();
        handle.dispose();
        handle.dispose();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.state(), ConnectionState::Disconnected);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_engine_plays_to_the_end() {
        let handle = EngineHandle::new(Arc::new(
            SimulatedEngine::new().with_tick(Duration::from_millis(50)),
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.subscribe(tx);
        handle.connect();
        assert_eq!(rx.recv().await, Some(EngineEvent::Connected));

        let short = track(1).with_duration_ms(1000);
        handle.load_and_play(&short);
        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::MediaReady { duration_ms: 1000 })
        );
        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::StateChanged { playing: true })
        );

        tokio::time::sleep(Duration::from_millis(400)).await;
        let position = handle.position_ms().unwrap();
        assert!((400..1000).contains(&position));

        assert_eq!(
            rx.recv().await,
            Some(EngineEvent::StateChanged { playing: false })
        );
        assert_eq!(rx.recv().await, Some(EngineEvent::MediaEnded));
        assert_eq!(handle.position_ms(), Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_engine_pause_freezes_position() {
        let handle = EngineHandle::new(Arc::new(SimulatedEngine::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.subscribe(tx);
        handle.connect();
        rx.recv().await.unwrap();

        handle.load_and_play(&track(1));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        handle.pause();
        let paused_at = handle.position_ms().unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(handle.position_ms(), Some(paused_at));

        handle.seek(500_000);
        assert_eq!(handle.position_ms(), Some(180_000));
    }
}

mod controller {
    use super::*;

    struct Harness {
        controller: TransportController,
        state: Property<PlaybackState>,
        _samples: mpsc::UnboundedReceiver<ClockSample>,
    }

    async fn harness(backend: Arc<dyn PlaybackEngine>) -> Harness {
        let engine = ready_handle(backend).await;
        let state = Property::new(PlaybackState::default());
        let (tx, samples) = mpsc::unbounded_channel();
        let controller = TransportController::new(
            engine,
            &PlaybackConfig::default(),
            state.clone(),
            Property::new(QueueSummary::default()),
            tx,
        )
        .with_rng(StdRng::seed_from_u64(3));
        Harness {
            controller,
            state,
            _samples: samples,
        }
    }

    fn sample(generation: u64, position_ms: u64) -> ClockSample {
        ClockSample {
            generation,
            position_ms,
            duration_ms: Some(60_000),
        }
    }

    fn current_generation(controller: &TransportController) -> u64 {
        controller.sample_generation().load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn samples_from_a_replaced_track_are_discarded() {
        let Harness {
            mut controller,
            state,
            _samples,
        } = harness(Arc::new(FixedEngine)).await;

        controller.set_queue(tracks(&[1, 2]), 0, false);
        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        let playing = current_generation(&controller);

        controller.handle_clock_sample(sample(playing - 1, 777));
        assert_eq!(state.get().position_ms, 0);

        controller.handle_clock_sample(sample(playing, 777));
        assert_eq!(state.get().position_ms, 777);
        assert_eq!(state.get().duration_ms, 60_000);

        controller.next();
        controller.handle_clock_sample(sample(playing, 900));
        assert_eq!(state.get().current_track.map(|t| t.id), Some(TrackId(2)));
        assert_eq!(state.get().position_ms, 0);

        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn reading_taken_while_the_next_track_loads_is_discarded() {
        let connection = Arc::new(LoadSnapshotConnection::default());
        let Harness {
            mut controller,
            state,
            _samples,
        } = harness(Arc::new(SharedEngine(connection.clone()))).await;
        *connection.generation.lock().unwrap() = Some(controller.sample_generation());

        controller.set_queue(tracks(&[1, 2]), 0, false);
        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        controller.seek_to(150_000);
        assert_eq!(state.get().position_ms, 150_000);

        controller.next();
        let racing = connection.snapshots.lock().unwrap().last().copied().unwrap();
        assert_eq!(racing.position_ms, 150_000);

        controller.handle_clock_sample(racing);
        assert_eq!(state.get().current_track.map(|t| t.id), Some(TrackId(2)));
        assert_eq!(state.get().position_ms, 0);

        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn samples_from_before_a_pause_are_discarded_after_resume() {
        let Harness {
            mut controller,
            state,
            _samples,
        } = harness(Arc::new(FixedEngine)).await;

        controller.set_queue(tracks(&[1]), 0, false);
        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        let queued = sample(current_generation(&controller), 4000);

        controller.handle_engine_event(EngineEvent::StateChanged { playing: false });
        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        controller.handle_clock_sample(queued);
        assert_eq!(state.get().position_ms, 0);

        controller.handle_clock_sample(sample(current_generation(&controller), 4500));
        assert_eq!(state.get().position_ms, 4500);

        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn samples_after_pause_are_discarded() {
        let Harness {
            mut controller,
            state,
            _samples,
        } = harness(Arc::new(FixedEngine)).await;

        controller.set_queue(tracks(&[1]), 0, false);
        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        let playing = current_generation(&controller);
        controller.handle_engine_event(EngineEvent::StateChanged { playing: false });
        controller.handle_clock_sample(sample(playing, 5000));

        assert_eq!(state.get().position_ms, 0);
        assert!(!state.get().is_playing);
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn engine_pause_only_moves_playing_to_paused() {
        let Harness {
            mut controller,
            _samples,
            ..
        } = harness(Arc::new(FixedEngine)).await;
        let summary = controller.summary_property();

        controller.handle_engine_event(EngineEvent::StateChanged { playing: false });
        assert_eq!(summary.get().transport, TransportState::Idle);

        controller.set_queue(tracks(&[1]), 0, false);
        assert_eq!(summary.get().transport, TransportState::Playing);

        controller.handle_engine_event(EngineEvent::StateChanged { playing: false });
        assert_eq!(summary.get().transport, TransportState::Paused);

        controller.handle_engine_event(EngineEvent::StateChanged { playing: true });
        assert_eq!(summary.get().transport, TransportState::Playing);
        controller.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn play_after_reconnect_reloads_and_retires_earlier_samples() {
        let connection = Arc::new(LoadSnapshotConnection::default());
        let Harness {
            mut controller,
            state,
            _samples,
        } = harness(Arc::new(SharedEngine(connection.clone()))).await;

        controller.set_queue(tracks(&[1]), 0, false);
        controller.pause();
        controller.handle_engine_event(EngineEvent::Connected);
        let before = current_generation(&controller);

        controller.play();
        assert!(current_generation(&controller) > before);
        assert_eq!(state.get().current_track.map(|t| t.id), Some(TrackId(1)));

        controller.shutdown();
    }
}
