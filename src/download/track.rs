//! Two-phase single-track download

use super::PlaylistDownloader;
use crate::error::TrackError;
use crate::types::{Event, Track};
use crate::utils::{
    MAX_FILENAME_CHARS, append_extension, clean_filename, directory_listing,
    resolve_output_path_excluding,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Output stem for a track whose sanitized title collides with another one
///
/// The id suffix is kept intact even when the stem has to be shortened to stay
/// within the filename limit.
pub(crate) fn disambiguated_stem(stem: &str, id: &str) -> String {
    let suffix = format!(" [{}]", clean_filename(id));
    let room = MAX_FILENAME_CHARS.saturating_sub(suffix.chars().count());
    let head: String = stem.chars().take(room).collect();
    let head = head.trim_end_matches([' ', '.']);
    format!("{head}{suffix}")
}

/// Output stems taken by the tracks of one playlist run, case-folded
#[derive(Debug, Clone, Default)]
pub(crate) struct StemReservations(Arc<Mutex<HashSet<String>>>);

impl StemReservations {
    /// Take `stem`, or its id-suffixed form when another track already holds it
    pub(crate) fn reserve(&self, stem: String, id: &str) -> String {
        let mut taken = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if taken.insert(stem.to_lowercase()) {
            return stem;
        }
        let alternative = disambiguated_stem(&stem, id);
        debug!(stem = %stem, alternative = %alternative, "output stem already taken");
        taken.insert(alternative.to_lowercase());
        alternative
    }

    /// Every reserved stem except `own`
    pub(crate) fn others(&self, own: &str) -> Vec<String> {
        let own = own.to_lowercase();
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|stem| **stem != own)
            .cloned()
            .collect()
    }
}

impl PlaylistDownloader {
    /// Download one track into `target_dir`
    ///
    /// Probes the track for its proposed filename, downloads it to the
    /// sanitized name and then locates the produced file on disk.
    ///
    /// # Errors
    ///
    /// Every failure is returned as a [`TrackError`]; none of them are fatal
    /// to a surrounding playlist download.
    pub async fn download_track(
        &self,
        track: &Track,
        target_dir: &Path,
    ) -> Result<PathBuf, TrackError> {
        self.run_track(track, target_dir, false, &StemReservations::default())
            .await
    }

    pub(crate) async fn run_track(
        &self,
        track: &Track,
        target_dir: &Path,
        disambiguate: bool,
        reservations: &StemReservations,
    ) -> Result<PathBuf, TrackError> {
        self.emit_event(Event::TrackStarted {
            id: track.id.clone(),
            title: track.title.clone(),
        });

        let result = self
            .fetch_and_resolve(track, target_dir, disambiguate, reservations)
            .await;

        match &result {
            Ok(path) => {
                info!(track_id = %track.id, path = %path.display(), "Track downloaded");
                self.emit_event(Event::TrackDownloaded {
                    id: track.id.clone(),
                    path: path.clone(),
                });
            }
            Err(reason) => {
                info!(
                    track_id = %track.id,
                    title = %track.title,
                    reason = %reason,
                    "Skipping track"
                );
                self.emit_event(Event::TrackSkipped {
                    id: track.id.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        result
    }

    async fn fetch_and_resolve(
        &self,
        track: &Track,
        target_dir: &Path,
        disambiguate: bool,
        reservations: &StemReservations,
    ) -> Result<PathBuf, TrackError> {
        // Phase 1: metadata only
        let probe = self
            .extractor
            .probe(&track.url)
            .await
            .map_err(|e| TrackError::ProbeFailed {
                url: track.url.clone(),
                reason: e.to_string(),
            })?;

        let mut stem = clean_filename(&probe.proposed_filename);
        if disambiguate {
            stem = disambiguated_stem(&stem, &track.id);
        }
        let stem = reservations.reserve(stem, &track.id);
        let stem_path = target_dir.join(&stem);

        debug!(track_id = %track.id, stem = %stem, "fetching track");

        // Phase 2: download and transcode
        self.extractor
            .fetch(&track.url, &stem_path)
            .await
            .map_err(|e| TrackError::FetchFailed {
                url: track.url.clone(),
                reason: e.to_string(),
            })?;

        let audio_format = &self.config.tools.audio_format;
        // Re-read on every poll: a neighbour may claim its stem meanwhile
        let other_stems = || reservations.others(&stem);
        match resolve_output_path_excluding(
            &stem_path,
            audio_format,
            &self.config.resolve,
            other_stems,
        )
        .await
        {
            Some(path) => Ok(path),
            None => {
                let listing = directory_listing(target_dir).await;
                debug!(
                    track_id = %track.id,
                    directory = %target_dir.display(),
                    ?listing,
                    "output file not found after download"
                );
                Err(TrackError::OutputNotFound {
                    expected: append_extension(&stem_path, audio_format),
                    directory: target_dir.to_path_buf(),
                })
            }
        }
    }
}
