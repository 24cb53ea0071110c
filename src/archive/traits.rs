//! Archiver trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Trait for writing downloaded files into a single archive
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Write `files` into a new archive at `archive_path`
    ///
    /// Entry names are relative to `base_dir`. A file outside `base_dir` is
    /// stored under its file name. An existing archive at `archive_path` is
    /// replaced. The source files are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::NoFiles` for an empty file list, and
    /// `CreateFailed` / `AddFailed` when the archive cannot be written. A
    /// partially written archive is removed.
    async fn create_archive(
        &self,
        files: &[PathBuf],
        archive_path: &Path,
        base_dir: &Path,
    ) -> crate::Result<PathBuf>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
