//! Configuration schema definitions and loading.
//!
//! Defines the configuration structure for Reel: general settings,
//! playback policy and library storage locations. All configurations
//! are serializable to/from TOML format and carry a JSON schema.

mod general;
mod library;
mod loading;
mod paths;
mod playback;


pub use general::{GeneralConfig, LogLevel};
pub use library::LibraryConfig;
pub use paths::ConfigPaths;
pub use playback::{EndOfQueue, PlaybackConfig};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Reel.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Playback queue and transport policy.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Track library and playlist storage.
    #[serde(default)]
    pub library: LibraryConfig,
}
