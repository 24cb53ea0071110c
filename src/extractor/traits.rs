//! Traits and types for media extraction

use async_trait::async_trait;
use std::path::Path;

use crate::types::TrackProbe;

/// Capabilities of an extractor implementation
#[derive(Debug, Clone, Copy)]
pub struct ExtractorCapabilities {
    /// Can resolve metadata without downloading
    pub can_extract: bool,
    /// Can download and transcode media
    pub can_fetch: bool,
}

/// Trait for the external extraction/download capability
///
/// The probe/fetch split mirrors the two-phase track download: a cheap
/// metadata query first, then a separate download call writing to a path the
/// caller chose from the probe.
///
/// Implementations must be safe to share across concurrent track tasks.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Resolve raw metadata for a URL without downloading any media
    ///
    /// For playlists the returned document carries an `entries` array whose
    /// items may be `null` for unavailable tracks.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be resolved at all (network error,
    /// private or missing resource) or the tool cannot be executed.
    async fn extract_info(&self, url: &str) -> crate::Result<serde_json::Value>;

    /// Resolve a single track's metadata and proposed output filename
    ///
    /// # Errors
    ///
    /// Returns an error for geo-blocked, removed or otherwise unavailable
    /// tracks.
    async fn probe(&self, url: &str) -> crate::Result<TrackProbe>;

    /// Download and transcode a single track
    ///
    /// `output_stem` is the target path without extension; the tool decides
    /// the final extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or transcode fails.
    async fn fetch(&self, url: &str, output_stem: &Path) -> crate::Result<()>;

    /// Query capabilities of this extractor
    fn capabilities(&self) -> ExtractorCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
