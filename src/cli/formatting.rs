//! Formatting utilities for CLI output.
//!
//! Provides consistent, colored rendering of tracks, playlists and playback
//! state, plus parsing of user-entered seek positions.

use crate::{
    cli::CliError,
    services::{
        library::{Playlist, Track},
        playback::{PlaybackState, QueueSummary, RepeatMode},
    },
};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Yellow color
    pub const YELLOW: &'static str = "\x1b[33m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a millisecond count as `m:ss`.
///
/// ```
/// use reel::cli::formatting::format_duration;
///
/// assert_eq!(format_duration(0), "0:00");
/// assert_eq!(format_duration(225_000), "3:45");
/// ```
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One-line description of a track: `title - artist (m:ss)`.
pub fn format_track(track: &Track) -> String {
    let mut line = track.title.clone();
    if let Some(artist) = &track.artist {
        line.push_str(" - ");
        line.push_str(artist);
    }
    format!("{line} ({})", format_duration(track.duration_ms))
}

/// One-line description of a playlist with its id and size.
pub fn format_playlist(playlist: &Playlist) -> String {
    format!(
        "{}{}{} {} {}",
        Colors::BOLD,
        playlist.name,
        Colors::RESET,
        format_description(playlist.id.as_str()),
        format_description(&format!("({} tracks)", playlist.track_ids.len())),
    )
}

/// Status line for the current playback state and queue flags.
pub fn format_status(state: &PlaybackState, queue: &QueueSummary) -> String {
    let Some(track) = &state.current_track else {
        return format_description("Nothing playing");
    };

    let (icon, color) = if state.is_playing {
        ("▶", Colors::GREEN)
    } else {
        ("⏸", Colors::YELLOW)
    };
    let repeat = match queue.repeat {
        RepeatMode::Off => "",
        RepeatMode::All => " [repeat all]",
        RepeatMode::One => " [repeat one]",
    };
    let shuffle = if queue.shuffle { " [shuffle]" } else { "" };
    let position = match queue.current_index {
        Some(index) => format!(" {}/{}", index + 1, queue.play_order.len()),
        None => String::new(),
    };

    format!(
        "{color}{icon}{} {} {} / {}{position}{shuffle}{repeat}",
        Colors::RESET,
        track.title,
        format_duration(state.position_ms),
        format_duration(state.duration_ms),
    )
}

fn invalid_position(reason: &str) -> CliError {
    CliError::InvalidArgument {
        arg: "position".to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a seek target into milliseconds.
///
/// Accepts seconds (`30`), `mm:ss` (`1:30`), a percentage of the duration
/// (`50%`) or a relative offset in seconds (`+10`, `-10`). Relative targets
/// may be negative; the controller clamps them.
///
/// # Errors
/// Returns `CliError::InvalidArgument` for malformed input or a percentage
/// when the duration is unknown
pub fn parse_seek(input: &str, position_ms: u64, duration_ms: u64) -> Result<i64, CliError> {
    let input = input.trim();

    if let Some(percentage) = input.strip_suffix('%') {
        let percentage: f64 = percentage
            .parse()
            .map_err(|_| invalid_position("Invalid percentage format"))?;
        if !(0.0..=100.0).contains(&percentage) {
            return Err(invalid_position("Percentage must be between 0 and 100"));
        }
        if duration_ms == 0 {
            return Err(invalid_position("Cannot use percentage - track length unknown"));
        }
        return Ok((duration_ms as f64 * percentage / 100.0) as i64);
    }

    if let Some(sign @ ('+' | '-')) = input.chars().next() {
        let delta: u64 = input[1..]
            .parse()
            .map_err(|_| invalid_position("Invalid relative seek format"))?;
        let delta_ms = i64::try_from(delta.saturating_mul(1000)).unwrap_or(i64::MAX);
        let current = i64::try_from(position_ms).unwrap_or(i64::MAX);
        return Ok(if sign == '+' {
            current.saturating_add(delta_ms)
        } else {
            current.saturating_sub(delta_ms)
        });
    }

    if let Some((minutes, seconds)) = input.split_once(':') {
        let minutes: u64 = minutes
            .parse()
            .map_err(|_| invalid_position("Invalid minutes value"))?;
        let seconds: u64 = seconds
            .parse()
            .map_err(|_| invalid_position("Invalid seconds value"))?;
        if seconds >= 60 {
            return Err(invalid_position("Seconds must be less than 60"));
        }
        let total = minutes
            .checked_mul(60)
            .and_then(|total| total.checked_add(seconds));
        return seconds_to_ms(total);
    }

    let seconds: u64 = input.parse().map_err(|_| {
        invalid_position(
            "Invalid position format. Use seconds, mm:ss, percentage (50%), or relative (+10, -10)",
        )
    })?;
    seconds_to_ms(Some(seconds))
}

fn seconds_to_ms(seconds: Option<u64>) -> Result<i64, CliError> {
    seconds
        .and_then(|seconds| seconds.checked_mul(1000))
        .and_then(|ms| i64::try_from(ms).ok())
        .ok_or_else(|| invalid_position("Position is too large"))
}
