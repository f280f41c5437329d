//! Play queue: base order, play order, shuffle and repeat state.
//!
//! The queue is a pure state machine. It never talks to the engine; the
//! transport controller applies its transitions and issues engine commands.
//!
//! The play order is stored as indices into the base order, so a track's
//! identity inside the queue is its base position. Toggling shuffle keeps
//! that identity even when the same catalog track appears more than once.

use rand::{Rng, seq::SliceRandom, thread_rng};

use super::{Direction, QueueError, RepeatMode};
use crate::services::library::Track;

/// Default position above which "previous" restarts the current track.
pub const DEFAULT_RESTART_THRESHOLD_MS: u64 = 3000;

/// Outcome of an explicit skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The current index moved to the contained value
    Moved(usize),

    /// Position was past the restart threshold; seek to zero, index unchanged
    Restart,
}

/// Shuffle `tracks` keeping the track at `pivot` first.
///
/// The remaining tracks are uniformly permuted. If `pivot` is out of range
/// every track is shuffled.
pub fn shuffled_queue(tracks: &[Track], pivot: usize) -> Vec<Track> {
    shuffled_queue_with(tracks, pivot, &mut thread_rng())
}

/// [`shuffled_queue`] with a caller-supplied random source.
pub fn shuffled_queue_with<R: Rng + ?Sized>(
    tracks: &[Track],
    pivot: usize,
    rng: &mut R,
) -> Vec<Track> {
    shuffled_order(tracks.len(), pivot, rng)
        .into_iter()
        .map(|index| tracks[index].clone())
        .collect()
}

fn shuffled_order<R: Rng + ?Sized>(len: usize, pivot: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).filter(|&index| index != pivot).collect();
    order.shuffle(rng);

    if pivot < len {
        order.insert(0, pivot);
    }
    order
}

/// Ordered sequence of tracks with a cursor, shuffle and repeat policy
#[derive(Debug, Clone)]
pub struct PlaybackQueue {
    base_order: Vec<Track>,
    play_order: Vec<usize>,
    current: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,
    restart_threshold_ms: u64,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new(DEFAULT_RESTART_THRESHOLD_MS)
    }
}

impl PlaybackQueue {
    /// Create an empty queue.
    pub fn new(restart_threshold_ms: u64) -> Self {
        Self {
            base_order: Vec::new(),
            play_order: Vec::new(),
            current: None,
            shuffle: false,
            repeat: RepeatMode::Off,
            restart_threshold_ms,
        }
    }

    /// Replace the queue wholesale and return the new current track.
    ///
    /// With `shuffle` the track at `start_index` becomes the first entry of a
    /// fresh shuffled order; without it the play order is `tracks` as given.
    ///
    /// # Errors
    /// Returns `QueueError::Empty` or `QueueError::IndexOutOfBounds`; the queue
    /// is left unchanged in both cases
    pub fn set(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        shuffle: bool,
    ) -> Result<&Track, QueueError> {
        self.set_with_rng(tracks, start_index, shuffle, &mut thread_rng())
    }

    /// [`set`](Self::set) with a caller-supplied random source.
    ///
    /// # Errors
    /// Same as [`set`](Self::set)
    pub fn set_with_rng<R: Rng + ?Sized>(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<&Track, QueueError> {
        if tracks.is_empty() {
            return Err(QueueError::Empty);
        }
        if start_index >= tracks.len() {
            return Err(QueueError::IndexOutOfBounds {
                index: start_index,
                len: tracks.len(),
            });
        }

        let len = tracks.len();
        self.base_order = tracks;
        self.shuffle = shuffle;

        if shuffle {
            self.play_order = shuffled_order(len, start_index, rng);
            self.current = Some(0);
        } else {
            self.play_order = (0..len).collect();
            self.current = Some(start_index);
        }

        self.current().ok_or(QueueError::Empty)
    }

    /// Drop every track. Shuffle and repeat settings are kept.
    pub fn clear(&mut self) {
        self.base_order.clear();
        self.play_order.clear();
        self.current = None;
    }

    /// Track at the current index.
    pub fn current(&self) -> Option<&Track> {
        let base = *self.play_order.get(self.current?)?;
        self.base_order.get(base)
    }

    /// Current index into the play order.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Tracks in the order the caller supplied them.
    pub fn base_order(&self) -> &[Track] {
        &self.base_order
    }

    /// Tracks in the order they will be played.
    pub fn play_order(&self) -> impl Iterator<Item = &Track> + '_ {
        self.play_order
            .iter()
            .filter_map(|&index| self.base_order.get(index))
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.play_order.len()
    }

    /// Whether the queue holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.play_order.is_empty()
    }

    /// Whether the current index is the last entry of the play order.
    pub fn is_last(&self) -> bool {
        self.current
            .is_some_and(|current| current + 1 == self.play_order.len())
    }

    /// Explicit skips wrap around, so any loaded queue has a next track.
    pub fn has_next(&self) -> bool {
        !self.is_empty()
    }

    /// Explicit skips wrap around, so any loaded queue has a previous track.
    pub fn has_previous(&self) -> bool {
        !self.is_empty()
    }

    /// Whether shuffle is enabled.
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    /// Current repeat policy.
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    /// Set the repeat policy.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Advance the repeat policy Off → All → One → Off and return it.
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    /// Flip shuffle without changing the current track.
    ///
    /// Enabling builds a fresh shuffled order with the current track first.
    /// Disabling restores the base order and points at the current track in it.
    ///
    /// # Errors
    /// Returns `QueueError::Empty` when there is no current track
    pub fn toggle_shuffle(&mut self) -> Result<bool, QueueError> {
        self.toggle_shuffle_with_rng(&mut thread_rng())
    }

    /// [`toggle_shuffle`](Self::toggle_shuffle) with a caller-supplied random source.
    ///
    /// # Errors
    /// Same as [`toggle_shuffle`](Self::toggle_shuffle)
    pub fn toggle_shuffle_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<bool, QueueError> {
        let pivot = self
            .current
            .and_then(|current| self.play_order.get(current).copied())
            .ok_or(QueueError::Empty)?;

        if self.shuffle {
            self.play_order = (0..self.base_order.len()).collect();
            self.current = Some(pivot);
        } else {
            self.play_order = shuffled_order(self.base_order.len(), pivot, rng);
            self.current = Some(0);
        }

        self.shuffle = !self.shuffle;
        Ok(self.shuffle)
    }

    /// Apply an explicit skip.
    ///
    /// Both directions wrap around regardless of the repeat policy. A
    /// `Previous` past the restart threshold leaves the index alone and asks
    /// for a restart instead.
    ///
    /// # Errors
    /// Returns `QueueError::Empty` on an empty queue
    pub fn advance(&mut self, direction: Direction, position_ms: u64) -> Result<Advance, QueueError> {
        let len = self.play_order.len();
        let current = self.current.filter(|_| len > 0).ok_or(QueueError::Empty)?;

        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous if position_ms > self.restart_threshold_ms => {
                return Ok(Advance::Restart);
            }
            Direction::Previous if current == 0 => len - 1,
            Direction::Previous => current - 1,
        };

        self.current = Some(next);
        Ok(Advance::Moved(next))
    }
}
