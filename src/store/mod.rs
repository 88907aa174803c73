//! The shared, version-controlled lock store.
//!
//! The remote repository is the only authority on lock state. A store keeps
//! one disposable working copy of it: [`VersionedStore::synchronize`] throws
//! away anything local and matches the remote tip, mutations happen as plain
//! file operations inside [`VersionedStore::working_directory`], and
//! [`VersionedStore::commit_and_push`] publishes them. A rejected push is the
//! only conflict signal; nothing here retries.

mod repo;


pub use repo::GitRepo;

use crate::error::Result;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::Path;

/// Author, date and body of the newest commit that touched a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    pub author: String,
    pub date: DateTime<FixedOffset>,
    /// Commit body without the subject line; empty when there is none.
    pub message: String,
}

/// Operations the lock manager needs from the shared repository.
pub trait VersionedStore {
    /// Clone the remote if there is no working copy, otherwise discard local
    /// divergence and reset to the remote tip. Fails with `Sync`.
    fn synchronize(&self) -> Result<()>;

    /// Stage everything, commit as `author` and push to the primary branch.
    ///
    /// Fails with `Commit` (including "nothing to commit") or `Push` (a
    /// rejected non-fast-forward push is reported as a conflict).
    fn commit_and_push(&self, message: &str, author: &str) -> Result<()>;

    /// Local path of the synchronized working copy.
    fn working_directory(&self) -> &Path;

    /// Newest commit touching `path` (relative to the working directory).
    /// Fails with `History` when the path has never been committed.
    fn latest_commit(&self, path: &Path) -> Result<CommitInfo>;
}
