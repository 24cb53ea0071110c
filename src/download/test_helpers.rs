//! Shared test helpers for exercising PlaylistDownloader without yt-dlp.

use crate::config::{Config, ResolveConfig, ThrottleConfig};
use crate::download::PlaylistDownloader;
use crate::extractor::{Extractor, ExtractorCapabilities};
use crate::types::TrackProbe;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the mock treats one track URL
#[derive(Clone, Debug, Default)]
pub(crate) enum Script {
    /// Probe and fetch succeed, a `.mp3` file is written
    #[default]
    Ok,
    /// Probe fails
    ProbeFails,
    /// Fetch fails
    FetchFails,
    /// Fetch succeeds but writes nothing
    NoOutput,
    /// Fetch writes the file with a different extension
    WritesExtension(&'static str),
    /// Fetch panics
    Panics,
}

/// Scripted extractor that writes real files into the target directory
#[derive(Default)]
pub(crate) struct MockExtractor {
    pub(crate) playlist: Option<Value>,
    pub(crate) scripts: HashMap<String, Script>,
    /// Proposed filenames that differ from the title, by URL
    pub(crate) filenames: HashMap<String, String>,
    /// Simulated download time per fetch
    pub(crate) fetch_delay: Duration,
    pub(crate) in_flight: AtomicUsize,
    pub(crate) max_in_flight: AtomicUsize,
    pub(crate) fetches: AtomicUsize,
}

impl MockExtractor {
    /// Mock serving a playlist of `(id, title)` tracks at `https://sc/t/<id>`
    pub(crate) fn with_tracks(title: &str, tracks: &[(&str, &str)]) -> Self {
        let entries: Vec<Value> = tracks
            .iter()
            .map(|(id, track_title)| {
                json!({
                    "id": id,
                    "title": track_title,
                    "uploader": "artist",
                    "webpage_url": track_url(id),
                })
            })
            .collect();

        Self {
            playlist: Some(json!({"id": "pl-1", "title": title, "entries": entries})),
            ..Self::default()
        }
    }

    pub(crate) fn script(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(track_url(id), script);
        self
    }

    /// Have the probe propose `filename` instead of the track title
    pub(crate) fn propose(mut self, id: &str, filename: &str) -> Self {
        self.filenames.insert(track_url(id), filename.to_string());
        self
    }

    pub(crate) fn fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    fn script_for(&self, url: &str) -> Script {
        self.scripts.get(url).cloned().unwrap_or_default()
    }

    fn entry_for(&self, url: &str) -> Option<Value> {
        self.playlist
            .as_ref()?
            .get("entries")?
            .as_array()?
            .iter()
            .find(|e| e.get("webpage_url").and_then(Value::as_str) == Some(url))
            .cloned()
    }
}

pub(crate) fn track_url(id: &str) -> String {
    format!("https://sc/t/{id}")
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract_info(&self, url: &str) -> crate::Result<Value> {
        if let Some(entry) = self.entry_for(url) {
            return Ok(entry);
        }
        self.playlist
            .clone()
            .ok_or_else(|| crate::Error::ExternalTool(format!("yt-dlp failed: {url}")))
    }

    async fn probe(&self, url: &str) -> crate::Result<TrackProbe> {
        if matches!(self.script_for(url), Script::ProbeFails) {
            return Err(crate::Error::ExternalTool(
                "ERROR: [soundcloud] geo restricted".to_string(),
            ));
        }
        let entry = self
            .entry_for(url)
            .ok_or_else(|| crate::Error::ExternalTool(format!("unknown url {url}")))?;
        let title = entry["title"].as_str().unwrap_or_default().to_string();
        let proposed_filename = self
            .filenames
            .get(url)
            .cloned()
            .unwrap_or_else(|| title.clone());
        Ok(TrackProbe {
            id: entry["id"].as_str().unwrap_or_default().to_string(),
            title,
            uploader: "artist".to_string(),
            proposed_filename,
            ext: Some("mp3".to_string()),
        })
    }

    async fn fetch(&self, url: &str, output_stem: &Path) -> crate::Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let ext = match self.script_for(url) {
            Script::Ok => "mp3",
            Script::WritesExtension(ext) => ext,
            Script::FetchFails => {
                return Err(crate::Error::ExternalTool(
                    "yt-dlp download failed: HTTP Error 403".to_string(),
                ));
            }
            Script::NoOutput | Script::ProbeFails => return Ok(()),
            Script::Panics => panic!("extractor blew up"),
        };

        let mut path = output_stem.as_os_str().to_os_string();
        path.push(".");
        path.push(ext);
        tokio::fs::write(&path, url.as_bytes()).await?;
        Ok(())
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: true,
            can_fetch: true,
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Config with no throttle delay and a short output-resolution window
pub(crate) fn fast_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.download.output_dir = output_dir.to_path_buf();
    config.throttle = ThrottleConfig::disabled();
    config.resolve = ResolveConfig {
        settle_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(10),
    };
    config
}

/// Build a downloader around `mock`, returning the shared mock handle too
pub(crate) fn create_test_downloader(
    config: Config,
    mock: MockExtractor,
) -> (PlaylistDownloader, Arc<MockExtractor>) {
    let mock = Arc::new(mock);
    let downloader =
        PlaylistDownloader::with_extractor(config, Arc::clone(&mock) as Arc<dyn Extractor>)
            .unwrap();
    (downloader, mock)
}
