//! No-op extractor for graceful degradation

use super::traits::{Extractor, ExtractorCapabilities};
use crate::types::TrackProbe;
use async_trait::async_trait;
use std::path::Path;

const MISSING_BINARY: &str = "requires the external yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

/// Extractor used when no yt-dlp binary is available or configured
///
/// Every operation returns `Error::NotSupported`, so a playlist download fails
/// with a clear message at metadata resolution instead of at startup.
///
/// # Examples
///
/// ```
/// use soundcloud_dl::extractor::{Extractor, NoOpExtractor};
///
/// # #[tokio::main]
/// # async fn main() {
/// let extractor = NoOpExtractor;
/// assert!(extractor.extract_info("https://soundcloud.com/a/sets/b").await.is_err());
/// assert!(!extractor.capabilities().can_fetch);
/// # }
/// ```
pub struct NoOpExtractor;

#[async_trait]
impl Extractor for NoOpExtractor {
    async fn extract_info(&self, _url: &str) -> crate::Result<serde_json::Value> {
        Err(crate::Error::NotSupported(format!(
            "Metadata extraction {MISSING_BINARY}"
        )))
    }

    async fn probe(&self, _url: &str) -> crate::Result<TrackProbe> {
        Err(crate::Error::NotSupported(format!(
            "Track probing {MISSING_BINARY}"
        )))
    }

    async fn fetch(&self, _url: &str, _output_stem: &Path) -> crate::Result<()> {
        Err(crate::Error::NotSupported(format!(
            "Track download {MISSING_BINARY}"
        )))
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: false,
            can_fetch: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
