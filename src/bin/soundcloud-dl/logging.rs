//! Console and rolling-file tracing for the command-line front end.
//!
//! Console lines go to stderr so progress output on stdout stays clean.
//! `RUST_LOG` replaces the console filter; the file always records this
//! crate at `debug`.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATE_TARGET: &str = "soundcloud_dl";
const LOG_FILE_PREFIX: &str = "soundcloud-dl";
const FILE_LEVEL: Level = Level::DEBUG;

/// How often a new log file is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogRotation {
    /// One file per hour
    Hourly,
    /// One file per day
    Daily,
    /// A single file that grows forever
    Never,
}

impl LogRotation {
    fn appender_rotation(self) -> Rotation {
        match self {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Where and how the binary logs
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory that receives `soundcloud-dl.<date>.log` files
    pub log_directory: PathBuf,
    /// Most verbose level printed on the console
    pub console_level: Level,
    /// File rotation period
    pub rotation: LogRotation,
    /// Rotated files kept on disk
    pub keep_files: usize,
}

/// Keeps the non-blocking file writer alive; dropping it flushes the log.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the console and file layers as the global subscriber
///
/// # Errors
///
/// Fails when the log directory cannot be created, the log file cannot be
/// opened, or another subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    std::fs::create_dir_all(&config.log_directory).map_err(|e| {
        LoggingError::DirectoryCreationFailed {
            path: config.log_directory.clone(),
            reason: e.to_string(),
        }
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.appender_rotation())
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(config.keep_files)
        .build(&config.log_directory)
        .map_err(|e| LoggingError::AppenderFailed(e.to_string()))?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate_directive(config.console_level)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(console_filter);
    let file = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new(crate_directive(FILE_LEVEL)));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// `warn` for dependencies, `level` for this crate
fn crate_directive(level: Level) -> String {
    format!("warn,{CRATE_TARGET}={}", level.as_str().to_lowercase())
}

/// Logging setup failures
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be created
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// Directory that was requested
        path: PathBuf,
        /// Underlying I/O error
        reason: String,
    },

    /// The rolling log file could not be opened
    #[error("Failed to open log file: {0}")]
    AppenderFailed(String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
