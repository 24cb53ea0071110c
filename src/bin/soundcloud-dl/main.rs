//! Command-line front end for soundcloud-dl.

mod logging;

use clap::Parser;
use logging::{LogRotation, LoggingConfig};
use soundcloud_dl::{Config, Error, Event, PlaylistDownloader, PlaylistRequest, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::Level;

/// Download a SoundCloud playlist as audio files using yt-dlp
#[derive(Debug, Parser)]
#[command(name = "soundcloud-dl", version, about)]
struct Cli {
    /// Playlist (or track, with --track) URL
    url: String,

    /// Directory that receives the playlist folder or archive
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Bundle the playlist into a zip archive
    #[arg(short, long)]
    zip: bool,

    /// Treat the URL as a single track
    #[arg(long, conflicts_with = "zip")]
    track: bool,

    /// Number of concurrent downloads [default: 3]
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Minimum delay after each download, in seconds
    #[arg(long, value_name = "S")]
    min_delay: Option<u64>,

    /// Maximum delay after each download, in seconds
    #[arg(long, value_name = "S")]
    max_delay: Option<u64>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long = "yt-dlp", value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Target audio codec (mp3, m4a, opus, ...)
    #[arg(long, value_name = "F")]
    audio_format: Option<String>,

    /// Audio quality: 0-10 VBR or a bitrate such as 192
    #[arg(long, value_name = "Q")]
    audio_quality: Option<String>,

    /// Directory for rotated log files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// How often to start a new log file
    #[arg(long, value_enum, default_value_t = LogRotation::Daily)]
    log_rotation: LogRotation,

    /// Number of rotated log files to keep
    #[arg(
        long,
        value_name = "N",
        default_value_t = 7,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    log_keep: u64,

    /// Print debug logging to the console
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the configuration file, if any, and apply flag overrides
    fn build_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.download.output_dir = dir.clone();
        }
        if self.zip {
            config.download.archive = true;
        }
        if let Some(workers) = self.workers {
            config.download.max_concurrent_downloads = workers;
        }
        if let Some(secs) = self.min_delay {
            config.throttle.min_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = self.max_delay {
            config.throttle.max_delay = Duration::from_secs(secs);
        }
        if let Some(path) = &self.yt_dlp {
            config.tools.ytdlp_path = Some(path.clone());
        }
        if let Some(format) = &self.audio_format {
            config.tools.audio_format = format.clone();
        }
        if let Some(quality) = &self.audio_quality {
            config.tools.audio_quality = quality.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Accept only absolute http(s) URLs
fn check_url(input: &str) -> Result<()> {
    let parsed = url::Url::parse(input.trim())
        .map_err(|e| Error::config("url", format!("invalid URL '{}': {}", input, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(
            "url",
            format!("unsupported URL scheme '{}', expected http or https", other),
        )),
    }
}

/// Progress line for an event, if it deserves one
fn describe(event: &Event) -> Option<String> {
    match event {
        Event::PlaylistResolved {
            title, track_count, ..
        } => Some(format!("Found playlist '{title}' with {track_count} tracks")),
        Event::TrackStarted { title, .. } => Some(format!("Downloading: {title}")),
        Event::TrackDownloaded { path, .. } => Some(format!("  saved {}", path.display())),
        Event::TrackSkipped { id, reason } => Some(format!("  skipped track {id}: {reason}")),
        Event::Throttling {
            delay_ms,
            completed,
            total,
        } => Some(format!(
            "[{completed}/{total}] waiting {:.1}s",
            *delay_ms as f64 / 1000.0
        )),
        Event::Archiving { file_count } => {
            Some(format!("Creating zip archive of {file_count} files"))
        }
        Event::Archived { .. } | Event::Complete { .. } | Event::Failed { .. } => None,
    }
}

async fn run(cli: Cli) -> Result<bool> {
    check_url(&cli.url)?;
    let config = cli.build_config()?;
    let output_dir = config.download.output_dir.clone();
    let archive = config.download.archive;

    let downloader = PlaylistDownloader::new(config)?;

    let mut events = downloader.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "progress output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = if cli.track {
        downloader
            .download_single(cli.url.trim(), &output_dir)
            .await
            .map(|path| {
                println!("Track downloaded: {}", path.display());
                true
            })
    } else {
        let request = PlaylistRequest::new(cli.url.trim(), output_dir).with_archive(archive);
        downloader.download_playlist(request).await.map(|outcome| {
            match outcome.path() {
                Some(path) => println!("Playlist downloaded: {}", path.display()),
                None => println!("Failed to download playlist."),
            }
            outcome.is_success()
        })
    };

    // Closing the channel lets the printer drain and exit
    drop(downloader);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "progress printer failed");
    }

    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = LoggingConfig {
        log_directory: cli.log_dir.clone(),
        console_level: if cli.verbose { Level::DEBUG } else { Level::WARN },
        rotation: cli.log_rotation,
        keep_files: usize::try_from(cli.log_keep).unwrap_or(usize::MAX),
    };
    let _guard = match logging::init(&logging_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: file logging disabled: {e}");
            None
        }
    };

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "soundcloud-dl failed");
            eprintln!("Error: {e}");
            println!("Failed to download playlist.");
            ExitCode::FAILURE
        }
    }
}
