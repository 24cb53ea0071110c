//! Configuration types for soundcloud-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Download behavior configuration (output directory, concurrency, archival)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Output directory (default: "./output")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum concurrent track downloads (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Bundle the playlist into a zip archive and remove the originals (default: false)
    #[serde(default)]
    pub archive: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            archive: false,
        }
    }
}

/// Randomized pause inserted after every completed track download
///
/// The delay is drawn uniformly from `[min_delay, max_delay]` and applies to
/// successes and failures alike.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Lower bound of the delay (default: 3 seconds)
    #[serde(default = "default_min_delay", with = "duration_serde")]
    pub min_delay: Duration,

    /// Upper bound of the delay (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_delay: default_min_delay(),
            max_delay: default_max_delay(),
        }
    }
}

impl ThrottleConfig {
    /// A throttle that never sleeps
    pub fn disabled() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// External tool (yt-dlp) location and transcode settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Target audio codec for transcoding (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Target audio quality passed to the transcoder (default: "192")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Source format selector (default: "bestaudio/best")
    #[serde(default = "default_format")]
    pub format: String,

    /// Output template used when probing for the proposed filename (default: "%(title)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            audio_format: default_audio_format(),
            audio_quality: default_audio_quality(),
            format: default_format(),
            output_template: default_output_template(),
        }
    }
}

/// Output file resolution after a fetch
///
/// The transcoder's final filename is not reliably predictable, so the
/// downloader polls the target directory until a matching file shows up or
/// `settle_timeout` elapses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Maximum time to wait for the output file to become visible (default: 2 seconds)
    #[serde(default = "default_settle_timeout", with = "duration_serde")]
    pub settle_timeout: Duration,

    /// Interval between directory checks, in milliseconds (default: 250)
    #[serde(default = "default_poll_interval", with = "millis_serde")]
    pub poll_interval: Duration,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            settle_timeout: default_settle_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Main configuration for [`PlaylistDownloader`](crate::PlaylistDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig): output directory, concurrency, archival
/// - [`throttle`](ThrottleConfig): politeness delay between completed downloads
/// - [`tools`](ToolsConfig): yt-dlp location and transcode settings
/// - [`resolve`](ResolveConfig): output-file resolution polling
///
/// `download` and `tools` are flattened, so their fields sit at the top level
/// of the JSON document.
///
/// The configuration is immutable once a downloader is built; it is shared
/// read-only across all track tasks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Throttle between completed downloads
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// External tool settings
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Output resolution settings
    #[serde(default)]
    pub resolve: ResolveConfig,
}

impl Config {
    /// Output directory
    pub fn output_dir(&self) -> &PathBuf {
        &self.download.output_dir
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their defaults. The result is validated.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the downloader cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::config(
                "max_concurrent_downloads",
                "max_concurrent_downloads must be at least 1",
            ));
        }

        if self.throttle.min_delay > self.throttle.max_delay {
            return Err(Error::config(
                "throttle.min_delay",
                format!(
                    "min_delay ({}s) must not exceed max_delay ({}s)",
                    self.throttle.min_delay.as_secs_f64(),
                    self.throttle.max_delay.as_secs_f64()
                ),
            ));
        }

        if self.tools.audio_format.trim().is_empty() {
            return Err(Error::config("audio_format", "audio_format must not be empty"));
        }

        if self.resolve.poll_interval.is_zero() {
            return Err(Error::config(
                "resolve.poll_interval",
                "poll_interval must be greater than zero",
            ));
        }

        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_min_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_audio_quality() -> String {
    "192".to_string()
}

fn default_format() -> String {
    "bestaudio/best".to_string()
}

fn default_output_template() -> String {
    "%(title)s".to_string()
}

fn default_settle_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(250)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond Duration serialization helper
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
