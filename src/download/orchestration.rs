//! Playlist fan-out, result collection and archival

use super::PlaylistDownloader;
use super::throttle::random_delay;
use super::track::StemReservations;
use crate::error::{Error, Result, TrackError};
use crate::types::{Artifact, Event, FailedTrack, PlaylistOutcome, PlaylistRequest, Track};
use crate::utils::clean_filename;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const NOTHING_DOWNLOADED: &str = "No files were successfully downloaded.";

/// Collision key for a title: sanitized and case-folded
fn stem_key(title: &str) -> String {
    clean_filename(title).to_lowercase()
}

/// Keys of sanitized titles shared by more than one track
///
/// Case is folded so the result also holds on case-insensitive filesystems.
pub(crate) fn colliding_stems(tracks: &[Track]) -> HashSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for track in tracks {
        *counts.entry(stem_key(&track.title)).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key)
        .collect()
}

/// Results gathered from the track tasks of one playlist
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub(crate) downloaded: Vec<PathBuf>,
    pub(crate) failed: Vec<FailedTrack>,
    claimed: HashSet<PathBuf>,
}

impl Collected {
    /// Record `path` for a finished track
    ///
    /// A path can only be listed once; a second claim is returned as an error.
    pub(crate) fn claim(&mut self, path: PathBuf) -> std::result::Result<(), TrackError> {
        if !self.claimed.insert(path.clone()) {
            return Err(TrackError::DuplicateOutput { path });
        }
        self.downloaded.push(path);
        Ok(())
    }

    pub(crate) fn skip(&mut self, track: Track, reason: TrackError) {
        self.failed.push(FailedTrack { track, reason });
    }
}

fn io_context(e: std::io::Error, what: &str, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        e.kind(),
        format!("Failed to {} '{}': {}", what, path.display(), e),
    ))
}

impl PlaylistDownloader {
    /// Download every available track of a playlist
    ///
    /// Tracks run on a pool of `max_concurrent_downloads` tasks. A failed track
    /// is recorded in [`PlaylistOutcome::failed`] and does not stop the others.
    /// After each completed track the orchestrator sleeps a random
    /// [`ThrottleConfig`](crate::config::ThrottleConfig) delay before the slot
    /// is reused.
    ///
    /// # Errors
    ///
    /// Fails if the output directory cannot be created, the playlist metadata
    /// cannot be resolved, or a requested archive cannot be written. When no
    /// track downloads the result is `Ok` with `artifact: None`.
    pub async fn download_playlist(&self, request: PlaylistRequest) -> Result<PlaylistOutcome> {
        let result = self.run_playlist(&request).await;
        if let Err(ref e) = result {
            error!(url = %request.url, error = %e, "Playlist download failed");
            self.emit_event(Event::Failed {
                error: e.to_string(),
            });
        }
        result
    }

    async fn run_playlist(&self, request: &PlaylistRequest) -> Result<PlaylistOutcome> {
        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| io_context(e, "create output directory", &request.output_dir))?;
        let output_dir = tokio::fs::canonicalize(&request.output_dir)
            .await
            .map_err(|e| io_context(e, "resolve output directory", &request.output_dir))?;

        let playlist = self.get_playlist_info(&request.url).await?;
        self.emit_event(Event::PlaylistResolved {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            track_count: playlist.tracks.len(),
        });

        let playlist_name = clean_filename(&playlist.title);
        let playlist_dir = output_dir.join(&playlist_name);
        tokio::fs::create_dir_all(&playlist_dir)
            .await
            .map_err(|e| io_context(e, "create playlist directory", &playlist_dir))?;

        let Collected { downloaded, failed, .. } =
            self.fetch_all(&playlist.tracks, &playlist_dir).await;

        let mut outcome = PlaylistOutcome {
            playlist_id: playlist.id,
            playlist_title: playlist.title,
            artifact: None,
            downloaded,
            failed,
        };

        if outcome.downloaded.is_empty() {
            error!(playlist_id = %outcome.playlist_id, "{}", NOTHING_DOWNLOADED);
            self.emit_event(Event::Failed {
                error: NOTHING_DOWNLOADED.to_string(),
            });
            return Ok(outcome);
        }

        let artifact = if request.archive {
            let archive_path = output_dir.join(format!("{playlist_name}.zip"));
            self.archive_playlist(&outcome.downloaded, &archive_path, &playlist_dir)
                .await?;
            Artifact::Archive(archive_path)
        } else {
            Artifact::Directory(playlist_dir)
        };

        info!(
            playlist_id = %outcome.playlist_id,
            path = %artifact.path().display(),
            downloaded = outcome.downloaded.len(),
            failed = outcome.failed.len(),
            "Playlist download complete"
        );
        self.emit_event(Event::Complete {
            path: artifact.path().to_path_buf(),
            downloaded: outcome.downloaded.len(),
            failed: outcome.failed.len(),
        });

        outcome.artifact = Some(artifact);
        Ok(outcome)
    }

    /// Run every track through the bounded pool, collecting in completion order
    async fn fetch_all(&self, tracks: &[Track], playlist_dir: &Path) -> Collected {
        let total = tracks.len();
        let workers = self.config.download.max_concurrent_downloads.max(1);
        let colliding = colliding_stems(tracks);
        if !colliding.is_empty() {
            debug!(count = colliding.len(), "disambiguating colliding track titles");
        }
        let reservations = StemReservations::default();

        // Each track is spawned so it keeps running while the consumer sleeps
        let mut results = stream::iter(tracks.iter().cloned())
            .map(|track| {
                let this = self.clone();
                let dir = playlist_dir.to_path_buf();
                let disambiguate = colliding.contains(&stem_key(&track.title));
                let task_track = track.clone();
                let reservations = reservations.clone();
                let handle = tokio::spawn(async move {
                    this.run_track(&task_track, &dir, disambiguate, &reservations)
                        .await
                });
                async move { (track, handle.await) }
            })
            .buffer_unordered(workers);

        let mut collected = Collected::default();
        let mut completed = 0;

        while let Some((track, joined)) = results.next().await {
            completed += 1;
            match joined {
                Ok(Ok(path)) => {
                    if let Err(reason) = collected.claim(path) {
                        warn!(track_id = %track.id, reason = %reason, "Dropping duplicate output");
                        self.emit_event(Event::TrackSkipped {
                            id: track.id.clone(),
                            reason: reason.to_string(),
                        });
                        collected.skip(track, reason);
                    }
                }
                Ok(Err(reason)) => collected.skip(track, reason),
                Err(e) => {
                    error!(track_id = %track.id, error = %e, "Track task panicked");
                    let reason = TrackError::TaskPanicked {
                        reason: e.to_string(),
                    };
                    self.emit_event(Event::TrackSkipped {
                        id: track.id.clone(),
                        reason: reason.to_string(),
                    });
                    collected.skip(track, reason);
                }
            }

            let delay = random_delay(&self.config.throttle);
            if !delay.is_zero() {
                debug!(delay_ms = delay.as_millis() as u64, completed, total, "throttling");
                self.emit_event(Event::Throttling {
                    delay_ms: delay.as_millis() as u64,
                    completed,
                    total,
                });
                tokio::time::sleep(delay).await;
            }
        }

        collected
    }

    /// Bundle the downloaded files, then remove them and the playlist directory
    async fn archive_playlist(
        &self,
        files: &[PathBuf],
        archive_path: &Path,
        playlist_dir: &Path,
    ) -> Result<()> {
        self.emit_event(Event::Archiving {
            file_count: files.len(),
        });
        info!(
            archiver = self.archiver.name(),
            archive = %archive_path.display(),
            file_count = files.len(),
            "Archiving playlist"
        );

        self.archiver
            .create_archive(files, archive_path, playlist_dir)
            .await?;

        for file in files {
            match tokio::fs::remove_file(file).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %file.display(), "archived file already removed");
                }
                Err(e) => return Err(io_context(e, "remove archived file", file)),
            }
        }
        tokio::fs::remove_dir_all(playlist_dir)
            .await
            .map_err(|e| io_context(e, "remove playlist directory", playlist_dir))?;

        self.emit_event(Event::Archived {
            path: archive_path.to_path_buf(),
        });
        Ok(())
    }
}
