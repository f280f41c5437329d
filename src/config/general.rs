use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings that are not tied to playback or the library.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct GeneralConfig {
    /// Verbosity used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity, from errors only to every clock sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors.
    Error,

    /// Engine connection failures and playlist save failures.
    Warn,

    /// Session lifecycle and transport changes.
    #[default]
    Info,

    /// Swallowed queue no-ops and dropped engine commands.
    Debug,

    /// Everything, including each published position sample.
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}
