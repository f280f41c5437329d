use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What auto-advance does after the last track when repeat is off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndOfQueue {
    /// Continue from the first track of the play order.
    #[default]
    Wrap,

    /// Leave the last track loaded and stop advancing.
    Stop,
}

/// Playback queue and transport policy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between position samples while playing, in milliseconds.
    pub position_interval_ms: u64,

    /// Position above which "previous" restarts the current track instead
    /// of moving to the previous one, in milliseconds.
    pub restart_threshold_ms: u64,

    /// Auto-advance behaviour at the end of the queue with repeat off.
    pub end_of_queue: EndOfQueue,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            position_interval_ms: 500,
            restart_threshold_ms: 3000,
            end_of_queue: EndOfQueue::Wrap,
        }
    }
}

impl PlaybackConfig {
    /// Position clock period. Zero is treated as one millisecond.
    pub fn position_interval(&self) -> Duration {
        Duration::from_millis(self.position_interval_ms.max(1))
    }
}
