use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigPaths;

/// Track library and playlist storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Playlist file location. Defaults to `~/.reel/playlists.json`.
    pub playlists_file: Option<PathBuf>,

    /// Name of the playlist used by the favorites toggle.
    pub favorites_name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            playlists_file: None,
            favorites_name: "Favorites".to_string(),
        }
    }
}

impl LibraryConfig {
    /// Resolved playlist file path.
    ///
    /// # Errors
    /// Returns an error if no override is set and the data directory cannot be determined
    pub fn playlists_path(&self) -> Result<PathBuf, std::io::Error> {
        match &self.playlists_file {
            Some(path) => Ok(path.clone()),
            None => ConfigPaths::playlists_file(),
        }
    }
}
