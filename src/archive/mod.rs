//! Bundling downloaded files into an archive
//!
//! The orchestrator only needs one operation from this module: write a set of
//! files into a single archive, naming entries relative to a base directory.
//! [`ZipArchiver`] is the implementation used by default.

mod traits;
mod zip;

pub use self::traits::Archiver;
pub use self::zip::ZipArchiver;
