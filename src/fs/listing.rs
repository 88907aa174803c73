//! Directory listings that skip hidden entries.

use crate::error::{ClaimerError, Result};
use std::fs;
use std::path::Path;

/// List visible (non-hidden) regular file names in `dir`, sorted.
pub fn list_files<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    list_entries(dir.as_ref(), false)
}

/// List visible (non-hidden) subdirectory names in `dir`, sorted.
pub fn list_dirs<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    list_entries(dir.as_ref(), true)
}

fn list_entries(dir: &Path, want_dirs: bool) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ClaimerError::Io(format!(
            "failed to list directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ClaimerError::Io(format!(
                "failed to read entry in '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| {
            ClaimerError::Io(format!(
                "failed to stat '{}': {}",
                entry.path().display(),
                e
            ))
        })?;
        if file_type.is_dir() == want_dirs {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(dir: &Path) {
        fs::write(dir.join("lock-b"), "").unwrap();
        fs::write(dir.join("lock-a"), "").unwrap();
        fs::write(dir.join(".gitkeep"), "").unwrap();
        fs::create_dir_all(dir.join("pool-1")).unwrap();
        fs::create_dir_all(dir.join(".git")).unwrap();
    }

    #[test]
    fn list_files_skips_hidden_files_and_directories() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        assert_eq!(list_files(temp.path()).unwrap(), vec!["lock-a", "lock-b"]);
    }

    #[test]
    fn list_dirs_skips_hidden_directories_and_files() {
        let temp = TempDir::new().unwrap();
        populate(temp.path());

        assert_eq!(list_dirs(temp.path()).unwrap(), vec!["pool-1"]);
    }

    #[test]
    fn listing_empty_directory_returns_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(list_files(temp.path()).unwrap().is_empty());
        assert!(list_dirs(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn listing_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = list_files(temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, ClaimerError::Io(_)));
        assert!(err.to_string().contains("failed to list directory"));
    }
}
