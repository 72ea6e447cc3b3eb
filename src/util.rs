//! Utility functions for lexdrill.

use std::fs;
use std::path::Path;

use crate::error::{DrillError, Result};

/// Maximum word-list file size that can be read into memory (10 MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Read a file into a string, refusing files over `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
///
/// # Errors
///
/// Returns an error if the file exceeds `max_size` or cannot be read.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| DrillError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(DrillError::validation(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| DrillError::storage(path, e))
}

/// Collection name derived from a word-list path: the file name up to its
/// first `.` (`gre.words.txt` → `gre`).
pub fn collection_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.split('.').next()?.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
