//! Media extraction through an external tool
//!
//! This module provides a trait-based architecture for the two operations the
//! downloader needs from the media-download tool: resolving metadata without
//! downloading, and downloading + transcoding a single track. It supports a
//! CLI implementation (using an external `yt-dlp` binary) and a stub used when
//! the binary is unavailable.
//!
//! ## Architecture
//!
//! The core abstraction is the [`Extractor`] trait. Implementations:
//!
//! - [`CliExtractor`]: runs the external `yt-dlp` binary
//! - [`NoOpExtractor`]: stub returning `Error::NotSupported`
//!
//! Tests substitute their own implementation of the trait.
//!
//! ## Usage
//!
//! ```no_run
//! use soundcloud_dl::extractor::{CliExtractor, Extractor, ExtractorOptions};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = CliExtractor::from_path(ExtractorOptions::default())
//!         .expect("yt-dlp binary not found");
//!
//!     let probe = extractor.probe("https://soundcloud.com/artist/track").await?;
//!     println!("would save as {}", probe.proposed_filename);
//!
//!     extractor
//!         .fetch("https://soundcloud.com/artist/track", Path::new("out/track"))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod parser;
mod traits;

pub use cli::{CliExtractor, ExtractorOptions};
pub use noop::NoOpExtractor;
pub use parser::{
    ExitStatus, parse_info_output, playlist_from_info, probe_from_info, summarize_stderr,
    track_from_entry,
};
pub use traits::{Extractor, ExtractorCapabilities};
