use thiserror::Error;

use crate::ReelError;

/// Errors that can occur during CLI command execution.
///
/// Each variant carries enough context for the user to see which input or
/// subsystem failed.
#[derive(Error, Debug)]
pub enum CliError {
    /// An argument value could not be used.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// Argument name
        arg: String,
        /// Why it was rejected
        reason: String,
    },

    /// A playlist id or name did not match any playlist.
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Configuration or catalog loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ReelError),

    /// A service could not complete the request.
    #[error("{service} error: {details}")]
    ServiceError {
        /// Service name
        service: String,
        /// Failure details
        details: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result of a command: text to print on success.
pub type CommandResult = Result<String, CliError>;
