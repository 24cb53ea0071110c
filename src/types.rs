//! Core types for soundcloud-dl

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::TrackError;

/// A single track resolved from playlist metadata
///
/// Construct through [`Track::new`], which rejects entries missing a URL,
/// title or identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Platform identifier
    pub id: String,
    /// Track title
    pub title: String,
    /// Uploader / artist (may be empty)
    pub artist: String,
    /// Source URL
    pub url: String,
}

impl Track {
    /// Build a track, returning `None` if the URL, title or id is empty
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        url: impl Into<String>,
    ) -> Option<Self> {
        let track = Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            url: url.into(),
        };
        if track.id.is_empty() || track.title.is_empty() || track.url.is_empty() {
            return None;
        }
        Some(track)
    }
}

/// A playlist and its well-formed tracks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Platform identifier
    pub id: String,
    /// Playlist title
    pub title: String,
    /// Tracks in listing order
    pub tracks: Vec<Track>,
}

/// Metadata returned by a probe (no media downloaded)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProbe {
    /// Platform identifier
    pub id: String,
    /// Track title
    pub title: String,
    /// Uploader (may be empty)
    pub uploader: String,
    /// The extractor's proposed output name for the configured template,
    /// without directory or extension
    pub proposed_filename: String,
    /// The source media extension, if reported
    pub ext: Option<String>,
}

/// Input for a playlist download
#[derive(Clone, Debug)]
pub struct PlaylistRequest {
    /// Playlist URL
    pub url: String,
    /// Directory that will receive the playlist subdirectory (or archive)
    pub output_dir: PathBuf,
    /// Bundle the result into a zip archive
    pub archive: bool,
}

impl PlaylistRequest {
    /// Create a request that keeps files on disk
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            archive: false,
        }
    }

    /// Request archival of the downloaded files
    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }
}

/// A track that contributed no file, with the reason
#[derive(Clone, Debug)]
pub struct FailedTrack {
    /// The track that failed
    pub track: Track,
    /// Why it failed
    pub reason: TrackError,
}

/// The artifact produced by a successful playlist download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Artifact {
    /// Files remain in this playlist directory
    Directory(PathBuf),
    /// Files were bundled into this zip archive
    Archive(PathBuf),
}

impl Artifact {
    /// Filesystem path of the artifact
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Directory(p) | Artifact::Archive(p) => p,
        }
    }
}

/// Result of a playlist download that did not fail fatally
///
/// `artifact` is `None` when no track produced a file.
#[must_use]
#[derive(Clone, Debug)]
pub struct PlaylistOutcome {
    /// Playlist identifier
    pub playlist_id: String,
    /// Playlist title
    pub playlist_title: String,
    /// Directory or archive, if anything was downloaded
    pub artifact: Option<Artifact>,
    /// Paths of downloaded files, in completion order
    ///
    /// After archival these paths no longer exist on disk.
    pub downloaded: Vec<PathBuf>,
    /// Tracks that were skipped
    pub failed: Vec<FailedTrack>,
}

impl PlaylistOutcome {
    /// Whether at least one track was downloaded
    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    /// Path of the produced artifact, if any
    pub fn path(&self) -> Option<&Path> {
        self.artifact.as_ref().map(Artifact::path)
    }
}

/// Event emitted during a playlist download
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Playlist metadata resolved
    PlaylistResolved {
        /// Playlist identifier
        id: String,
        /// Playlist title
        title: String,
        /// Number of well-formed tracks
        track_count: usize,
    },

    /// A track task started
    TrackStarted {
        /// Track identifier
        id: String,
        /// Track title
        title: String,
    },

    /// A track was downloaded
    TrackDownloaded {
        /// Track identifier
        id: String,
        /// Resolved file path
        path: PathBuf,
    },

    /// A track was skipped
    TrackSkipped {
        /// Track identifier
        id: String,
        /// Reason for the skip
        reason: String,
    },

    /// The orchestrator is pausing before freeing a worker slot
    Throttling {
        /// Delay in milliseconds
        delay_ms: u64,
        /// Completed tasks so far
        completed: usize,
        /// Total tasks
        total: usize,
    },

    /// Archival started
    Archiving {
        /// Number of files being archived
        file_count: usize,
    },

    /// Archival finished
    Archived {
        /// Archive path
        path: PathBuf,
    },

    /// Playlist finished with at least one file
    Complete {
        /// Artifact path
        path: PathBuf,
        /// Files downloaded
        downloaded: usize,
        /// Tracks skipped
        failed: usize,
    },

    /// Playlist finished with nothing downloaded
    Failed {
        /// Error message
        error: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_requires_id_title_and_url() {
        assert!(Track::new("1", "Song", "", "https://x/1").is_some());
        assert!(Track::new("", "Song", "Artist", "https://x/1").is_none());
        assert!(Track::new("1", "", "Artist", "https://x/1").is_none());
        assert!(Track::new("1", "Song", "Artist", "").is_none());
    }

    #[test]
    fn empty_artist_is_allowed() {
        let track = Track::new("1", "Song", "", "https://x/1").unwrap();
        assert!(track.artist.is_empty());
    }

    #[test]
    fn outcome_without_artifact_is_failure() {
        let outcome = PlaylistOutcome {
            playlist_id: "p".into(),
            playlist_title: "P".into(),
            artifact: None,
            downloaded: vec![],
            failed: vec![],
        };
        assert!(!outcome.is_success());
        assert!(outcome.path().is_none());
    }

    #[test]
    fn outcome_path_follows_artifact() {
        let outcome = PlaylistOutcome {
            playlist_id: "p".into(),
            playlist_title: "P".into(),
            artifact: Some(Artifact::Archive(PathBuf::from("/out/P.zip"))),
            downloaded: vec![PathBuf::from("/out/P/a.mp3")],
            failed: vec![],
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.path(), Some(Path::new("/out/P.zip")));
    }

    #[test]
    fn request_builder_sets_archive_flag() {
        let request = PlaylistRequest::new("https://x/sets/a", "/tmp/out").with_archive(true);
        assert!(request.archive);
        assert_eq!(request.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::TrackSkipped {
            id: "42".into(),
            reason: "geo restricted".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "track_skipped");
        assert_eq!(json["id"], "42");
    }
}
