//! Test configuration helpers for creating downloaders around a fake extractor

use soundcloud_dl::config::{ResolveConfig, ThrottleConfig};
use soundcloud_dl::{Config, Extractor, PlaylistDownloader};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::fixtures::FakeExtractor;

/// Config with no throttle delay and a short output-resolution window
pub fn fast_config(output_dir: &Path, workers: usize) -> Config {
    let mut config = Config::default();
    config.download.output_dir = output_dir.to_path_buf();
    config.download.max_concurrent_downloads = workers;
    config.throttle = ThrottleConfig::disabled();
    config.resolve = ResolveConfig {
        settle_timeout: Duration::from_millis(100),
        poll_interval: Duration::from_millis(10),
    };
    config
}

/// Create a downloader backed by `fake`
pub fn create_downloader(config: Config, fake: FakeExtractor) -> PlaylistDownloader {
    let extractor: Arc<dyn Extractor> = Arc::new(fake);
    PlaylistDownloader::with_extractor(config, extractor).expect("valid test config")
}
