//! Utility functions for filename sanitization and output path resolution

use crate::config::ResolveConfig;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::time::Instant;

/// Characters that are illegal or risky on at least one common filesystem
pub const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a sanitized filename, in characters
pub const MAX_FILENAME_CHARS: usize = 200;

/// Name used when sanitization leaves nothing behind
pub const PLACEHOLDER_FILENAME: &str = "untitled";

/// Extensions of in-progress artifacts written by the extractor
const PARTIAL_EXTENSIONS: &[&str] = &["part", "ytdl", "temp", "tmp"];

#[allow(clippy::expect_used)]
static RESERVED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])(\..*)?$")
        .expect("valid reserved-name pattern")
});

/// Map an arbitrary title or proposed filename to a filesystem-safe name
///
/// - Control characters become spaces, [`UNSAFE_FILENAME_CHARS`] become `_`
/// - Whitespace runs collapse to a single space
/// - Leading/trailing spaces and dots are trimmed
/// - Windows device names (`CON`, `NUL`, `COM1`, ...) get a `_` prefix
/// - The result is capped at [`MAX_FILENAME_CHARS`] characters
/// - An empty result becomes [`PLACEHOLDER_FILENAME`]
///
/// The function is pure and idempotent.
///
/// # Examples
///
/// ```
/// use soundcloud_dl::utils::clean_filename;
///
/// assert_eq!(clean_filename("AC/DC: Back in Black?"), "AC_DC_ Back in Black_");
/// assert_eq!(clean_filename("  lots   of\tspace  "), "lots of space");
/// assert_eq!(clean_filename("..."), "untitled");
/// ```
#[must_use]
pub fn clean_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_control() {
                ' '
            } else if UNSAFE_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = trim_spaces_and_dots(&collapsed);

    let guarded = if RESERVED_NAME.is_match(trimmed) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    };

    let truncated: String = guarded.chars().take(MAX_FILENAME_CHARS).collect();
    let result = truncated.trim_end_matches([' ', '.']);

    if result.is_empty() {
        PLACEHOLDER_FILENAME.to_string()
    } else {
        result.to_string()
    }
}

fn trim_spaces_and_dots(s: &str) -> &str {
    s.trim_matches([' ', '.'])
}

/// Append `.ext` to a path without touching any dots already in the name
///
/// `Path::with_extension` would replace the last dotted segment of titles
/// such as `"Live v1.2"`.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Locate the file the extractor actually produced for `stem_path`
///
/// Candidates, in order:
/// 1. `stem_path` with `expected_ext` appended
/// 2. `stem_path` as-is
/// 3. a file in the same directory whose stem equals, or else starts with,
///    the file name of `stem_path` (partial download artifacts are ignored)
///
/// The check runs immediately and is then repeated every
/// `settle.poll_interval` until `settle.settle_timeout` has elapsed.
pub async fn resolve_output_path(
    stem_path: &Path,
    expected_ext: &str,
    settle: &ResolveConfig,
) -> Option<PathBuf> {
    resolve_output_path_excluding(stem_path, expected_ext, settle, Vec::<String>::new).await
}

/// [`resolve_output_path`] for a directory shared with other downloads
///
/// A prefix match is skipped when its stem also starts with a longer stem
/// returned by `other_stems`, since that file belongs to the other download.
/// `other_stems` is called on every poll and must return lowercase stems.
pub async fn resolve_output_path_excluding<F>(
    stem_path: &Path,
    expected_ext: &str,
    settle: &ResolveConfig,
    other_stems: F,
) -> Option<PathBuf>
where
    F: Fn() -> Vec<String>,
{
    let deadline = Instant::now() + settle.settle_timeout;

    loop {
        let others = other_stems();
        if let Some(found) = find_output_file(stem_path, expected_ext, &others).await {
            return Some(found);
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(settle.poll_interval).await;
    }
}

async fn find_output_file(
    stem_path: &Path,
    expected_ext: &str,
    other_stems: &[String],
) -> Option<PathBuf> {
    let with_ext = append_extension(stem_path, expected_ext);
    if is_file(&with_ext).await {
        return Some(with_ext);
    }
    if is_file(stem_path).await {
        return Some(stem_path.to_path_buf());
    }
    scan_for_stem(stem_path, other_stems).await
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn scan_for_stem(stem_path: &Path, other_stems: &[String]) -> Option<PathBuf> {
    let dir = stem_path.parent()?;
    let stem = stem_path.file_name()?.to_str()?;

    let mut candidates = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !is_file(&path).await || is_partial_artifact(&path) {
            continue;
        }
        let Some(file_stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !file_stem.starts_with(stem) {
            continue;
        }
        let exact = file_stem == stem;
        if !exact && owned_by_other(file_stem, stem, other_stems) {
            continue;
        }
        candidates.push((exact, path));
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    candidates.into_iter().next().map(|(_, path)| path)
}

fn owned_by_other(file_stem: &str, stem: &str, other_stems: &[String]) -> bool {
    let file_stem = file_stem.to_lowercase();
    other_stems
        .iter()
        .any(|other| other.len() > stem.len() && file_stem.starts_with(other.as_str()))
}

fn is_partial_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            PARTIAL_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// File names in `dir`, sorted, for diagnostics
pub async fn directory_listing(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(mut entries) = tokio::fs::read_dir(dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
}
