use std::{io, path::PathBuf};

/// Errors raised by playlist stores
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("playlist store I/O on '{path}': {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The stored playlists could not be encoded or decoded
    #[error("playlist store '{path}' holds invalid JSON: {source}")]
    Json {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Store-specific failure
    #[error("playlist store unavailable: {0}")]
    Unavailable(String),
}
