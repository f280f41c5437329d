use std::{env, error::Error, io};

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{ConfigPaths, LogLevel};

const LOG_FORMAT_VAR: &str = "REEL_LOG_FORMAT";
const LOG_FILES_KEPT: usize = 7;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

enum Destination {
    Terminal,
    File,
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

fn output_layer<W>(writer: W, destination: Destination) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let json = env::var(LOG_FORMAT_VAR).is_ok_and(|format| format == "json");
    let layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(writer);

    match (json, destination) {
        (true, _) => layer.json().boxed(),
        (false, Destination::Terminal) => layer.pretty().with_thread_names(true).boxed(),
        (false, Destination::File) => layer.compact().with_ansi(false).boxed(),
    }
}

/// Install the global subscriber, logging to stderr.
///
/// `RUST_LOG` wins over the configured level. Output is pretty, or JSON
/// when `REEL_LOG_FORMAT=json`.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(level: LogLevel) -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(output_layer(io::stderr, Destination::Terminal))
        .with(env_filter(level))
        .try_init()?;
    Ok(())
}

/// Install the global subscriber, logging to a daily rolling file.
///
/// Used by the interactive player so the terminal stays clean. The guard
/// flushes buffered records on drop and must live as long as the program.
///
/// # Errors
/// Returns error if the log directory or appender cannot be created, or
/// a global subscriber is already installed
pub fn init_with_file(level: LogLevel) -> Result<WorkerGuard, Box<dyn Error>> {
    let appender = Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix("reel")
        .filename_suffix("log")
        .build(ConfigPaths::log_dir()?)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(output_layer(writer, Destination::File))
        .with(env_filter(level))
        .try_init()?;
    Ok(guard)
}
