//! Reel - playback orchestration for a local media player.
//!
//! Reel owns the play queue, shuffle and repeat ordering, and the transport
//! commands sent to an external playback engine, while keeping a locally
//! observable playback state in sync with that engine. The main pieces are:
//!
//! - [`services::playback`]: queue, engine handle, position clock and the
//!   session actor that serializes every mutation
//! - [`services::library`]: track catalog, library views and playlists
//! - [`config`]: TOML configuration with JSON schema
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use reel::{config::Config, services::{PlaybackSession, SimulatedEngine}};
//!
//! # async fn demo(tracks: Vec<reel::services::Track>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let session = PlaybackSession::start(Arc::new(SimulatedEngine::new()), &config.playback);
//!
//! session.set_queue(tracks, 0, false)?;
//! session.settled().await?;
//! println!("Now playing: {:?}", session.state().current_track);
//!
//! session.dispose().await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface.
pub mod cli;

/// Reactive services: library and playback.
pub mod services;

/// Logging initialisation.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{ReelError, Result};
