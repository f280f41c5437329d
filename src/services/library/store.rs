use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{Playlist, StoreError};

/// Persistence contract for playlists.
///
/// The whole list is loaded and saved at once.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Load every stored playlist.
    async fn load(&self) -> Result<Vec<Playlist>, StoreError>;

    /// Replace the stored playlists with `playlists`.
    async fn save(&self, playlists: &[Playlist]) -> Result<(), StoreError>;
}

/// Playlist store writing a pretty-printed JSON array to a single file
#[derive(Debug, Clone)]
pub struct JsonPlaylistStore {
    path: PathBuf,
}

impl JsonPlaylistStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl PlaylistStore for JsonPlaylistStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Playlist>, StoreError> {
        if !self.path.exists() {
            debug!("No playlist file yet");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| self.json_error(e))
    }

    #[instrument(skip(self, playlists), fields(path = %self.path.display(), count = playlists.len()))]
    async fn save(&self, playlists: &[Playlist]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(playlists).map_err(|e| self.json_error(e))?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))?;

        Ok(())
    }
}
