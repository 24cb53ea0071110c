//! Scripted extractor that stands in for yt-dlp

use async_trait::async_trait;
use serde_json::{Value, json};
use soundcloud_dl::{Error, Extractor, ExtractorCapabilities, Result, TrackProbe};
use std::collections::HashSet;
use std::path::Path;

/// URL the fake serves for a track id
pub fn track_url(id: &str) -> String {
    format!("https://soundcloud.com/artist/{id}")
}

/// URL the fake serves the playlist at
pub const PLAYLIST_URL: &str = "https://soundcloud.com/artist/sets/fixture";

/// Fake extractor serving one playlist and writing real `.mp3` files
pub struct FakeExtractor {
    playlist: Value,
    probe_failures: HashSet<String>,
    fetch_failures: HashSet<String>,
}

impl FakeExtractor {
    /// Playlist of `(id, title)` tracks
    pub fn new(title: &str, tracks: &[(&str, &str)]) -> Self {
        let entries: Vec<Value> = tracks
            .iter()
            .map(|(id, track_title)| {
                json!({
                    "id": id,
                    "title": track_title,
                    "uploader": "fixture artist",
                    "webpage_url": track_url(id),
                })
            })
            .collect();
        Self::from_info(json!({"id": "fixture", "title": title, "entries": entries}))
    }

    /// Serve an arbitrary metadata document
    pub fn from_info(playlist: Value) -> Self {
        Self {
            playlist,
            probe_failures: HashSet::new(),
            fetch_failures: HashSet::new(),
        }
    }

    /// Make the probe for `id` fail
    pub fn fail_probe(mut self, id: &str) -> Self {
        self.probe_failures.insert(track_url(id));
        self
    }

    /// Make the download for `id` fail
    pub fn fail_fetch(mut self, id: &str) -> Self {
        self.fetch_failures.insert(track_url(id));
        self
    }

    fn entry(&self, url: &str) -> Option<&Value> {
        self.playlist["entries"]
            .as_array()?
            .iter()
            .find(|e| e["webpage_url"].as_str() == Some(url))
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract_info(&self, url: &str) -> Result<Value> {
        if url == PLAYLIST_URL {
            return Ok(self.playlist.clone());
        }
        self.entry(url)
            .cloned()
            .ok_or_else(|| Error::ExternalTool(format!("ERROR: Unable to download JSON metadata: {url}")))
    }

    async fn probe(&self, url: &str) -> Result<TrackProbe> {
        if self.probe_failures.contains(url) {
            return Err(Error::ExternalTool(
                "ERROR: [soundcloud] This track is not available in your country".to_string(),
            ));
        }
        let entry = self
            .entry(url)
            .ok_or_else(|| Error::ExternalTool(format!("unknown track {url}")))?;
        let title = entry["title"].as_str().unwrap_or_default().to_string();
        Ok(TrackProbe {
            id: entry["id"].as_str().unwrap_or_default().to_string(),
            title: title.clone(),
            uploader: "fixture artist".to_string(),
            proposed_filename: title,
            ext: Some("mp3".to_string()),
        })
    }

    async fn fetch(&self, url: &str, output_stem: &Path) -> Result<()> {
        if self.fetch_failures.contains(url) {
            return Err(Error::ExternalTool(
                "yt-dlp download failed: HTTP Error 404".to_string(),
            ));
        }
        let mut path = output_stem.as_os_str().to_os_string();
        path.push(".mp3");
        tokio::fs::write(&path, format!("audio for {url}")).await?;
        Ok(())
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: true,
            can_fetch: true,
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
