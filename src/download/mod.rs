//! Playlist downloader split into focused submodules.
//!
//! The `PlaylistDownloader` struct and its methods are organized by domain:
//! - [`track`] - Two-phase single-track download (probe, fetch, resolve)
//! - [`orchestration`] - Playlist fan-out, result collection and archival
//! - [`throttle`] - Randomized politeness delay between completions

mod orchestration;
mod throttle;
mod track;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use throttle::random_delay;

use crate::archive::{Archiver, ZipArchiver};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{
    CliExtractor, Extractor, ExtractorOptions, NoOpExtractor, playlist_from_info,
    track_from_entry,
};
use crate::types::{Event, Playlist};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main entry point for downloading playlists and tracks
///
/// Cloning is cheap: every field is shared behind an `Arc` or a broadcast
/// sender, and clones are handed to the per-track tasks.
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Immutable configuration shared with every track task
    pub(crate) config: Arc<Config>,
    /// Metadata and media extraction backend
    pub(crate) extractor: Arc<dyn Extractor>,
    /// Archive writer used when a request asks for a zip
    pub(crate) archiver: Arc<dyn Archiver>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl PlaylistDownloader {
    /// Create a new PlaylistDownloader
    ///
    /// Validates the configuration and picks the extractor: the configured
    /// `ytdlp_path` first, then a PATH search (when `search_path` is set), and
    /// finally [`NoOpExtractor`], which makes every download fail with
    /// `Error::NotSupported`.
    pub fn new(config: Config) -> Result<Self> {
        let options = ExtractorOptions::from(&config.tools);

        let extractor: Arc<dyn Extractor> = if let Some(ref ytdlp_path) = config.tools.ytdlp_path
        {
            // Use explicitly configured binary path
            Arc::new(CliExtractor::new(ytdlp_path.clone(), options))
        } else if config.tools.search_path {
            CliExtractor::from_path(options)
                .map(|e| Arc::new(e) as Arc<dyn Extractor>)
                .unwrap_or_else(|| Arc::new(NoOpExtractor))
        } else {
            // No binary configured and PATH search disabled
            Arc::new(NoOpExtractor)
        };

        let caps = extractor.capabilities();
        tracing::info!(
            extractor = extractor.name(),
            can_extract = caps.can_extract,
            can_fetch = caps.can_fetch,
            "Extractor initialized"
        );

        Self::with_extractor(config, extractor)
    }

    /// Create a PlaylistDownloader around an existing extractor
    ///
    /// Used to plug in alternative backends or test doubles.
    pub fn with_extractor(config: Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        config.validate()?;

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            extractor,
            archiver: Arc::new(ZipArchiver),
            event_tx,
        })
    }

    /// Replace the archive writer
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }

    /// Subscribe to download events
    ///
    /// Each subscriber receives every event emitted after it subscribed.
    /// Slow subscribers may observe `RecvError::Lagged`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use soundcloud_dl::{Config, PlaylistDownloader, PlaylistRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = PlaylistDownloader::new(Config::default())?;
    ///     let mut events = downloader.subscribe();
    ///
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "download event");
    ///         }
    ///     });
    ///
    ///     let request = PlaylistRequest::new("https://soundcloud.com/a/sets/b", "output");
    ///     let outcome = downloader.download_playlist(request).await?;
    ///     println!("{:?}", outcome.path());
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the active extractor
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Emit an event to all subscribers
    ///
    /// Events are dropped when nobody is subscribed.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Resolve playlist metadata without downloading any media
    ///
    /// Unavailable and malformed entries are dropped from the result.
    ///
    /// # Errors
    ///
    /// Fails if the extractor cannot resolve the URL, or if the metadata
    /// lacks a playlist id or title.
    pub async fn get_playlist_info(&self, url: &str) -> Result<Playlist> {
        let info = self.extractor.extract_info(url).await?;
        let playlist = playlist_from_info(&info)?;

        tracing::info!(
            playlist_id = %playlist.id,
            title = %playlist.title,
            track_count = playlist.tracks.len(),
            "Playlist metadata resolved"
        );
        Ok(playlist)
    }

    /// Download a single track URL into `output_dir`
    ///
    /// No playlist subdirectory is created and no throttle delay applies.
    pub async fn download_single(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    output_dir.display(),
                    e
                ),
            ))
        })?;

        let info = self.extractor.extract_info(url).await?;
        let track = track_from_entry(&info).ok_or_else(|| {
            Error::Extraction(format!("no downloadable track found at {}", url))
        })?;

        Ok(self.download_track(&track, output_dir).await?)
    }
}
