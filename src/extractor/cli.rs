//! CLI-based extractor using the external yt-dlp binary

use super::parser::{ExitStatus, parse_info_output, probe_from_info, summarize_stderr};
use super::traits::{Extractor, ExtractorCapabilities};
use crate::config::ToolsConfig;
use crate::types::TrackProbe;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Format and transcode settings passed to every yt-dlp invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Format selector (`-f`)
    pub format: String,
    /// Target audio codec for `--audio-format`
    pub audio_format: String,
    /// Audio quality: `0`-`10` VBR, or a bitrate such as `192` / `192K`
    pub audio_quality: String,
    /// Output template used when probing for the proposed filename
    pub output_template: String,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self::from(&ToolsConfig::default())
    }
}

impl From<&ToolsConfig> for ExtractorOptions {
    fn from(tools: &ToolsConfig) -> Self {
        Self {
            format: tools.format.clone(),
            audio_format: tools.audio_format.clone(),
            audio_quality: tools.audio_quality.clone(),
            output_template: tools.output_template.clone(),
        }
    }
}

impl ExtractorOptions {
    /// Audio quality as yt-dlp expects it on the command line
    ///
    /// Bare numbers above 10 are bitrates in kbps and gain a `K` suffix.
    fn quality_arg(&self) -> String {
        let quality = self.audio_quality.trim();
        match quality.parse::<u32>() {
            Ok(n) if n > 10 => format!("{n}K"),
            _ => quality.to_string(),
        }
    }
}

/// CLI-based extractor running the external `yt-dlp` binary
///
/// # Examples
///
/// ```no_run
/// use soundcloud_dl::extractor::{CliExtractor, Extractor, ExtractorOptions};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/bin/yt-dlp"), ExtractorOptions::default());
///
/// // Or auto-discover from PATH
/// let extractor = CliExtractor::from_path(ExtractorOptions::default())
///     .expect("yt-dlp not found in PATH");
///
/// let info = extractor.extract_info("https://soundcloud.com/artist/sets/mix").await?;
/// # Ok(())
/// # }
/// ```
pub struct CliExtractor {
    binary_path: PathBuf,
    options: ExtractorOptions,
}

impl CliExtractor {
    /// Create a new CLI extractor with an explicit binary path
    pub fn new(binary_path: PathBuf, options: ExtractorOptions) -> Self {
        Self {
            binary_path,
            options,
        }
    }

    /// Attempt to find `yt-dlp` in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path(options: ExtractorOptions) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|path| Self::new(path, options))
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn extract_info_args(&self, url: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--ignore-errors",
            "--no-warnings",
            "--no-progress",
            "--",
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn probe_args(&self, url: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--no-playlist",
            "--skip-download",
            "--no-warnings",
            "-f",
            self.options.format.as_str(),
            "-o",
            self.options.output_template.as_str(),
            "--",
            url,
        ]
        .into_iter()
        .map(OsString::from)
        .collect()
    }

    fn fetch_args(&self, url: &str, output_stem: &Path) -> Vec<OsString> {
        let quality = self.options.quality_arg();
        let mut args: Vec<OsString> = [
            "-f",
            self.options.format.as_str(),
            "-x",
            "--audio-format",
            self.options.audio_format.as_str(),
            "--audio-quality",
            quality.as_str(),
            "--no-playlist",
            "--no-progress",
            "--quiet",
            "--no-warnings",
            "--skip-unavailable-fragments",
            "-o",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        // yt-dlp appends the final extension itself
        let mut template = escape_template(output_stem);
        template.push(".%(ext)s");
        args.push(template);
        args.push(OsString::from("--"));
        args.push(OsString::from(url));
        args
    }

    async fn run(&self, args: Vec<OsString>) -> crate::Result<std::process::Output> {
        tracing::debug!(binary = %self.binary_path.display(), ?args, "running yt-dlp");
        Command::new(&self.binary_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))
    }
}

/// Output path as a literal yt-dlp template: `%` becomes `%%`
fn escape_template(path: &Path) -> OsString {
    match path.to_str() {
        Some(s) if s.contains('%') => OsString::from(s.replace('%', "%%")),
        _ => path.as_os_str().to_os_string(),
    }
}

#[async_trait]
impl Extractor for CliExtractor {
    async fn extract_info(&self, url: &str) -> crate::Result<serde_json::Value> {
        let output = self.run(self.extract_info_args(url)).await?;

        parse_info_output(
            &output.stdout,
            &output.stderr,
            ExitStatus::from(output.status.success()),
            true,
        )
    }

    async fn probe(&self, url: &str) -> crate::Result<TrackProbe> {
        let output = self.run(self.probe_args(url)).await?;

        let info = parse_info_output(
            &output.stdout,
            &output.stderr,
            ExitStatus::from(output.status.success()),
            false,
        )?;
        probe_from_info(&info)
    }

    async fn fetch(&self, url: &str, output_stem: &Path) -> crate::Result<()> {
        let output = self.run(self.fetch_args(url, output_stem)).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(crate::Error::ExternalTool(format!(
                "yt-dlp download failed: {}",
                summarize_stderr(&output.stderr)
            )))
        }
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: true,
            can_fetch: true,
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
