use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for the Reel application.
///
/// Covers configuration loading and the filesystem work done around it.
/// Playback and library subsystems carry their own error enums.
#[derive(Error, Debug)]
pub enum ReelError {
    /// Configuration field missing or invalid
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfigField {
        /// The field that is invalid
        field: String,
        /// Reason why the field is invalid
        reason: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// TOML serialization error
    #[error("failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Catalog file could not be read or decoded
    #[error("failed to load catalog '{path}': {details}")]
    Catalog {
        /// Path of the catalog file
        path: PathBuf,
        /// Decoding error details
        details: String,
    },
}

/// A specialized `Result` type for Reel operations.
pub type Result<T> = result::Result<T, ReelError>;

impl ReelError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        ReelError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates a catalog loading error for `path`.
    pub fn catalog(error: impl fmt::Display, path: &Path) -> Self {
        ReelError::Catalog {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
