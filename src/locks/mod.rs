//! Exclusive guard over the local working copy.
//!
//! Every lock-manager operation hard-resets the working copy, so two
//! operations must never run against the same directory at once. Within a
//! process that is a mutex; across processes it is a lock file next to the
//! working copy (`<working_dir>.lock`), created with **create_new** semantics
//! so only one holder can exist. The file holds JSON metadata naming the
//! holder and is removed when the guard drops.
//!
//! A killed process never drops its guard. Its file is taken over once the
//! recorded process is gone from this host, or once it outlives the
//! configured stale limit.

mod guard;
mod metadata;


pub use guard::WorkdirLock;
pub use metadata::LockMetadata;

use crate::error::{ClaimerError, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Stale files removed before giving up on a lock that keeps reappearing.
const MAX_TAKEOVERS: usize = 2;

/// Path of the lock file guarding `working_dir`.
///
/// It sits beside the working copy, not inside it, so `git add -A` and
/// `git clean` never see it. Relative paths (including `.`) are resolved
/// against the current directory first.
pub fn workdir_lock_path(working_dir: &Path) -> Result<PathBuf> {
    let dir = absolute(working_dir)?;
    let Some(name) = dir.file_name() else {
        return Err(ClaimerError::UserError(format!(
            "working directory '{}' has no parent to hold its lock file",
            working_dir.display()
        )));
    };

    let mut name = name.to_os_string();
    name.push(".lock");
    Ok(dir.with_file_name(name))
}

/// Acquire the working-directory lock for `action`.
///
/// Fails with `ClaimerError::Locked` while a live holder exists. A holder
/// whose process has exited, or that is older than `stale_minutes` (0 never
/// expires), is taken over.
pub fn acquire_workdir_lock(
    working_dir: &Path,
    action: &str,
    stale_minutes: u32,
) -> Result<WorkdirLock> {
    let lock_path = workdir_lock_path(working_dir)?;

    if let Some(parent) = lock_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            ClaimerError::Io(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    for _ in 0..=MAX_TAKEOVERS {
        match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
            Ok(file) => return write_metadata(file, lock_path, action),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                remove_stale(&lock_path, stale_minutes)?;
            }
            Err(e) => {
                return Err(ClaimerError::Locked(format!(
                    "failed to create lock '{}': {}",
                    lock_path.display(),
                    e
                )));
            }
        }
    }

    Err(ClaimerError::Locked(format!(
        "working directory is in use (lock keeps reappearing)\nLock: {}",
        lock_path.display()
    )))
}

fn write_metadata(mut file: File, lock_path: PathBuf, action: &str) -> Result<WorkdirLock> {
    let metadata = LockMetadata::for_current_process(action);
    let json = metadata.to_json()?;
    if let Err(e) = file.write_all(json.as_bytes()).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(&lock_path);
        return Err(ClaimerError::Locked(format!(
            "failed to write lock metadata: {}",
            e
        )));
    }

    Ok(WorkdirLock::held(lock_path, metadata))
}

/// Delete the existing lock file if its holder is gone, or fail with
/// `Locked` naming the holder.
fn remove_stale(lock_path: &Path, stale_minutes: u32) -> Result<()> {
    let in_use = |holder: String| {
        ClaimerError::Locked(format!(
            "working directory is in use{}\nLock: {}",
            holder,
            lock_path.display()
        ))
    };

    let reason = match LockMetadata::read(lock_path) {
        Ok(holder) => match holder.staleness(stale_minutes) {
            Some(reason) => {
                warn!(
                    lock = %lock_path.display(),
                    holder = %holder.describe(),
                    reason = %reason,
                    "taking over stale working directory lock"
                );
                reason
            }
            None => return Err(in_use(format!(" (held by {})", holder.describe()))),
        },
        // Unreadable metadata is also what a holder looks like between
        // create and write, so only its file age can expire it.
        Err(_) => match file_age_minutes(lock_path) {
            None => return Ok(()),
            Some(age) if stale_minutes > 0 && age >= i64::from(stale_minutes) => {
                warn!(
                    lock = %lock_path.display(),
                    age_minutes = age,
                    "taking over unreadable working directory lock"
                );
                format!("unreadable for {}m", age)
            }
            Some(_) => return Err(in_use(String::new())),
        },
    };

    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ClaimerError::Locked(format!(
            "failed to remove stale lock '{}' ({}): {}",
            lock_path.display(),
            reason,
            e
        ))),
    }
}

/// Minutes since `path` was last written; `None` once it is gone.
fn file_age_minutes(path: &Path) -> Option<i64> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let modified: DateTime<Utc> = modified.into();
    Some(Utc::now().signed_duration_since(modified).num_minutes())
}

/// `path` made absolute with `.` and `..` resolved lexically.
fn absolute(path: &Path) -> Result<PathBuf> {
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().map_err(|e| {
            ClaimerError::Io(format!("failed to read current directory: {}", e))
        })?
    };

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}
