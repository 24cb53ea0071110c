//! Error types for soundcloud-dl
//!
//! This module provides the error handling for the library:
//! - A crate-level [`Error`] for fatal conditions (configuration, playlist
//!   extraction, archival, I/O)
//! - [`TrackError`] for per-track failures, which are recorded and skipped by
//!   the playlist orchestrator and never abort a playlist
//! - [`ArchiveError`] for failures while bundling downloaded files
//! - Machine-readable error codes for logging and CLI reporting

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for soundcloud-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for soundcloud-dl
///
/// Each variant includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_downloads")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Playlist-level extraction failed (unreachable, private, malformed)
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// External tool execution failed (yt-dlp)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Single-track failure
    #[error("track error: {0}")]
    Track(#[from] TrackError),

    /// Archive creation failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Per-track errors
///
/// These are recovered locally by the playlist orchestrator: the track is
/// logged, recorded as failed and skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackError {
    /// Metadata probe failed (geo-block, removal, format error)
    #[error("probe failed for {url}: {reason}")]
    ProbeFailed {
        /// The track URL that was probed
        url: String,
        /// The reason the probe failed
        reason: String,
    },

    /// Download or transcode failed
    #[error("fetch failed for {url}: {reason}")]
    FetchFailed {
        /// The track URL that was fetched
        url: String,
        /// The reason the fetch failed
        reason: String,
    },

    /// The extractor reported success but no output file could be located
    #[error("file not found after download: {expected} (in {directory})")]
    OutputNotFound {
        /// The sanitized output path, with the target audio extension appended
        expected: PathBuf,
        /// The directory that was scanned
        directory: PathBuf,
    },

    /// The located file was already claimed by another track of the playlist
    #[error("output {path} already belongs to another track")]
    DuplicateOutput {
        /// The contested file
        path: PathBuf,
    },

    /// The download task panicked or was aborted
    #[error("download task failed: {reason}")]
    TaskPanicked {
        /// The join error message
        reason: String,
    },
}

/// Archive creation errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to create or finalize the archive file
    #[error("failed to create archive {archive}: {reason}")]
    CreateFailed {
        /// The archive path
        archive: PathBuf,
        /// The reason creation failed
        reason: String,
    },

    /// Failed to add a file to the archive
    #[error("failed to add {file} to archive: {reason}")]
    AddFailed {
        /// The file that could not be added
        file: PathBuf,
        /// The reason the file could not be added
        reason: String,
    },

    /// Nothing to archive
    #[error("no files to archive")]
    NoFiles,
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Extraction(_) => "extraction_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Track(_) => "track_error",
            Error::Archive(_) => "archive_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}
