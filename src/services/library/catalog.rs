use std::{fs, path::Path};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{MediaKind, Track};
use crate::{ReelError, Result};

/// Source of immutable track records.
///
/// Implementations may return a different list on every call (e.g. after a
/// rescan). Callers rely on track identity, never on list positions.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// List every track of `kind` in catalog order.
    async fn list_tracks(&self, kind: MediaKind) -> Vec<Track>;
}

/// Catalog backed by an in-memory list that can be replaced on rescan.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tracks: RwLock<Vec<Track>>,
}

impl MemoryCatalog {
    /// Create a catalog holding `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: RwLock::new(tracks),
        }
    }

    /// Load a catalog from a JSON array of tracks.
    ///
    /// # Errors
    /// Returns `ReelError::Catalog` if the file cannot be read or decoded
    #[instrument]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReelError::catalog(e, path))?;
        let tracks: Vec<Track> =
            serde_json::from_str(&content).map_err(|e| ReelError::catalog(e, path))?;

        debug!("Loaded {} catalog entries", tracks.len());
        Ok(Self::new(tracks))
    }

    /// Replace the catalog contents, as a rescan would.
    pub async fn replace(&self, tracks: Vec<Track>) {
        *self.tracks.write().await = tracks;
    }
}

#[async_trait]
impl TrackCatalog for MemoryCatalog {
    async fn list_tracks(&self, kind: MediaKind) -> Vec<Track> {
        self.tracks
            .read()
            .await
            .iter()
            .filter(|track| track.kind == kind)
            .cloned()
            .collect()
    }
}
