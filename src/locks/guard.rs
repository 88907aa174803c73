//! The held working-directory lock.

use super::LockMetadata;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Exclusive hold on a working copy. Dropping it deletes the lock file.
#[derive(Debug)]
pub struct WorkdirLock {
    path: PathBuf,
    metadata: LockMetadata,
}

impl WorkdirLock {
    pub(super) fn held(path: PathBuf, metadata: LockMetadata) -> Self {
        debug!(lock = %path.display(), action = %metadata.action, "working directory locked");
        Self { path, metadata }
    }
}

impl Drop for WorkdirLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(lock = %self.path.display(), "working directory unlocked"),
            // Left behind, the file holds off other processes until it goes stale.
            Err(e) => warn!(
                lock = %self.path.display(),
                action = %self.metadata.action,
                error = %e,
                "failed to remove working directory lock"
            ),
        }
    }
}
