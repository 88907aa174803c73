//! Create and delete helpers.

use crate::error::{ClaimerError, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Create an empty file at `path`, creating parent directories as needed.
///
/// An existing file is left untouched.
pub fn touch<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ClaimerError::Io(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ClaimerError::Io(format!("failed to create '{}': {}", path.display(), e))
        })?;

    Ok(())
}

/// Remove `path` recursively. Works for both files and directories.
pub fn remove_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| ClaimerError::Io(format!("failed to remove '{}': {}", path.display(), e)))
}
