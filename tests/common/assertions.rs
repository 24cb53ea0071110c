//! Custom assertions for downloaded files and archives

use std::fs::File;
use std::path::Path;

/// Sorted file names directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("readable directory")
        .map(|entry| {
            entry
                .expect("readable entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Sorted entry names of a zip archive
pub fn zip_entry_names(archive_path: &Path) -> Vec<String> {
    let file = File::open(archive_path).expect("archive exists");
    let archive = zip::ZipArchive::new(file).expect("valid zip archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Assert that every path in `paths` has been removed
pub fn assert_all_removed(paths: &[std::path::PathBuf]) {
    for path in paths {
        assert!(!path.exists(), "{} should have been removed", path.display());
    }
}
