//! Types returned by the lock manager.

use crate::config::Config;
use crate::store::CommitInfo;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Subdirectory holding claimed lock files.
pub const CLAIMED_DIR: &str = "claimed";

/// Subdirectory holding unclaimed lock files.
pub const UNCLAIMED_DIR: &str = "unclaimed";

/// Placeholder keeping an empty bucket tracked by git.
pub const PLACEHOLDER: &str = ".gitkeep";

/// Which bucket a lock file currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Claimed,
    Unclaimed,
}

impl LockState {
    pub fn dir_name(self) -> &'static str {
        match self {
            LockState::Claimed => CLAIMED_DIR,
            LockState::Unclaimed => UNCLAIMED_DIR,
        }
    }
}

/// Git's default human-readable date format (`Mon Jan 2 15:04:05 2006 -0700`).
const GIT_DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Who claimed a lock, when, and why. Derived from history, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ownership {
    pub owner: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
}

impl Ownership {
    pub fn display_date(&self) -> String {
        self.date.format(GIT_DATE_FORMAT).to_string()
    }
}

impl From<CommitInfo> for Ownership {
    fn from(info: CommitInfo) -> Self {
        Self {
            owner: info.author,
            date: info.date,
            message: info.message,
        }
    }
}

/// One lock in a status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub pool: String,
    pub lock: String,
    /// `pool` for single-lock pools, `pool/lock` otherwise.
    pub name: String,
    pub state: LockState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
}

impl LockStatus {
    pub fn is_claimed(&self) -> bool {
        self.state == LockState::Claimed
    }

    pub fn owner(&self) -> Option<&str> {
        self.ownership.as_ref().map(|o| o.owner.as_str())
    }
}

/// Behavior switches for [`super::LockManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Extra attempts after a rejected push.
    pub push_retries: u32,
    /// Refuse to pick among several free locks of a bare pool name.
    pub require_explicit_lock: bool,
    /// Age at which a leftover working-directory lock is taken over.
    pub stale_lock_minutes: u32,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ManagerOptions {
    fn from(config: &Config) -> Self {
        Self {
            push_retries: config.push_retries,
            require_explicit_lock: config.require_explicit_lock,
            stale_lock_minutes: config.stale_lock_minutes,
        }
    }
}

/// Contents of one pool directory in the working copy.
#[derive(Debug, Clone)]
pub(crate) struct PoolLayout {
    pub name: String,
    pub dir: PathBuf,
    pub claimed: Vec<String>,
    pub unclaimed: Vec<String>,
}

impl PoolLayout {
    pub fn total(&self) -> usize {
        self.claimed.len() + self.unclaimed.len()
    }

    pub fn contains(&self, state: LockState, lock: &str) -> bool {
        let bucket = match state {
            LockState::Claimed => &self.claimed,
            LockState::Unclaimed => &self.unclaimed,
        };
        bucket.iter().any(|l| l == lock)
    }

    pub fn display_name(&self, lock: &str) -> String {
        super::target::display_name(&self.name, lock, self.total())
    }

    /// Absolute path of `lock` in the given bucket.
    pub fn path(&self, state: LockState, lock: &str) -> PathBuf {
        self.dir.join(state.dir_name()).join(lock)
    }

    /// Path of `lock` relative to the working copy, as git history sees it.
    pub fn relative_path(&self, state: LockState, lock: &str) -> PathBuf {
        Path::new(&self.name).join(state.dir_name()).join(lock)
    }
}
