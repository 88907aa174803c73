//! Lock file move helper.
//!
//! Claiming and releasing are both "move this file to the other bucket".
//! On POSIX filesystems this is a `rename(2)`. Some mounts surface `EXDEV`
//! ("Invalid cross-device link") even when paths look local; for those we
//! fall back to copy + delete.

use crate::error::{ClaimerError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Move `source` to `destination`, replacing any existing destination file.
///
/// Parent directories of `destination` are created when missing.
pub fn move_path<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ClaimerError::Io(format!(
                "failed to create destination directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_rename(&e) => move_cross_device(source, destination, e),
        Err(e) => Err(ClaimerError::Io(format!(
            "failed to move '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ))),
    }
}

fn move_cross_device(source: &Path, destination: &Path, original_error: io::Error) -> Result<()> {
    fs::copy(source, destination).map_err(|e| {
        ClaimerError::Io(format!(
            "failed to copy '{}' for cross-device move: {} (original rename error: {})",
            source.display(),
            e,
            original_error
        ))
    })?;

    fs::remove_file(source).map_err(|e| {
        ClaimerError::Io(format!(
            "copied across devices but failed to delete source '{}': {}",
            source.display(),
            e
        ))
    })
}

fn is_cross_device_rename(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(18)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn move_path_moves_file_and_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("pool/unclaimed/lock");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"").unwrap();

        let destination = temp.path().join("pool/claimed/lock");
        move_path(&source, &destination).unwrap();

        assert!(!source.exists());
        assert!(destination.is_file());
    }

    #[test]
    fn move_path_replaces_existing_destination_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");

        fs::write(&source, b"new").unwrap();
        fs::write(&destination, b"old").unwrap();

        move_path(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(&destination).unwrap(), b"new");
    }

    #[test]
    fn move_path_missing_source_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = move_path(temp.path().join("missing"), temp.path().join("dest")).unwrap_err();
        assert!(matches!(err, ClaimerError::Io(_)));
        assert!(err.to_string().contains("failed to move"));
    }
}
