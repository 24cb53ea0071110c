//! # soundcloud-dl
//!
//! Concurrent playlist downloader for SoundCloud, built on top of `yt-dlp`.
//!
//! Metadata resolution and media transcoding are delegated to the external
//! tool through the [`Extractor`] trait. This crate owns the rest: a bounded
//! pool of per-track tasks, per-track failure isolation, a randomized delay
//! between completions, filename sanitization, locating the produced files,
//! and optional zip archival.
//!
//! ## Quick Start
//!
//! ```no_run
//! use soundcloud_dl::{Config, PlaylistDownloader, PlaylistRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = PlaylistDownloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let request = PlaylistRequest::new("https://soundcloud.com/artist/sets/mix", "output")
//!         .with_archive(true);
//!     let outcome = downloader.download_playlist(request).await?;
//!
//!     match outcome.path() {
//!         Some(path) => println!("Playlist downloaded: {}", path.display()),
//!         None => println!("Failed to download playlist."),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Zip archival of downloaded files
pub mod archive;
/// Configuration types
pub mod config;
/// Playlist downloader (decomposed into focused submodules)
pub mod download;
/// Error types
pub mod error;
/// External extraction tool integration
pub mod extractor;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use archive::{Archiver, ZipArchiver};
pub use config::{Config, DownloadConfig, ResolveConfig, ThrottleConfig, ToolsConfig};
pub use download::PlaylistDownloader;
pub use error::{ArchiveError, Error, Result, TrackError};
pub use extractor::{
    CliExtractor, Extractor, ExtractorCapabilities, ExtractorOptions, NoOpExtractor,
};
pub use types::{
    Artifact, Event, FailedTrack, Playlist, PlaylistOutcome, PlaylistRequest, Track, TrackProbe,
};
pub use utils::clean_filename;
