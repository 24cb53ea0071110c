use super::traits::Archiver;
use crate::error::{ArchiveError, Error, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// Archiver writing Deflate-compressed ZIP files
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl ZipArchiver {
    /// Entry name for `file` relative to `base_dir`, with `/` separators
    fn entry_name(file: &Path, base_dir: &Path) -> Option<String> {
        let relative = file
            .strip_prefix(base_dir)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty());

        match relative {
            Some(rel) => {
                let parts: Vec<String> = rel
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("/"))
                }
            }
            None => file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }

    /// Write the archive synchronously
    pub fn write_archive(files: &[PathBuf], archive_path: &Path, base_dir: &Path) -> Result<PathBuf> {
        if files.is_empty() {
            return Err(Error::Archive(ArchiveError::NoFiles));
        }

        debug!(
            ?archive_path,
            file_count = files.len(),
            "creating ZIP archive"
        );

        let result = Self::write_entries(files, archive_path, base_dir);
        if result.is_err() && archive_path.exists() {
            if let Err(e) = std::fs::remove_file(archive_path) {
                warn!(?archive_path, error = %e, "failed to remove partial archive");
            }
        }
        result?;

        info!(
            ?archive_path,
            file_count = files.len(),
            "ZIP archive created"
        );
        Ok(archive_path.to_path_buf())
    }

    fn write_entries(files: &[PathBuf], archive_path: &Path, base_dir: &Path) -> Result<()> {
        let create_failed = |reason: String| {
            Error::Archive(ArchiveError::CreateFailed {
                archive: archive_path.to_path_buf(),
                reason,
            })
        };

        let out = File::create(archive_path)
            .map_err(|e| create_failed(format!("failed to create file: {}", e)))?;
        let mut writer = ZipWriter::new(BufWriter::new(out));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for file in files {
            let add_failed = |reason: String| {
                Error::Archive(ArchiveError::AddFailed {
                    file: file.clone(),
                    reason,
                })
            };

            let name = Self::entry_name(file, base_dir)
                .ok_or_else(|| add_failed("path has no file name".to_string()))?;

            let mut input =
                File::open(file).map_err(|e| add_failed(format!("failed to open: {}", e)))?;

            writer
                .start_file(name.as_str(), options)
                .map_err(|e| add_failed(format!("failed to start entry: {}", e)))?;

            std::io::copy(&mut input, &mut writer)
                .map_err(|e| add_failed(format!("failed to write entry: {}", e)))?;

            debug!(entry = %name, "added archive entry");
        }

        writer
            .finish()
            .map_err(|e| create_failed(format!("failed to finalize: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    async fn create_archive(
        &self,
        files: &[PathBuf],
        archive_path: &Path,
        base_dir: &Path,
    ) -> Result<PathBuf> {
        let files = files.to_vec();
        let archive_path = archive_path.to_path_buf();
        let base_dir = base_dir.to_path_buf();

        tokio::task::spawn_blocking(move || Self::write_archive(&files, &archive_path, &base_dir))
            .await
            .map_err(|e| Error::Other(format!("archive task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
