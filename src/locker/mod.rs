//! The lock manager: claim, release and inspect locks held in the shared
//! repository.
//!
//! Every operation has the same shape:
//!
//! 1. Take the in-process mutex and the working-directory lock file
//! 2. Synchronize the working copy with the remote (discarding local state)
//! 3. Inspect the pool directories
//! 4. Move/create/remove lock files locally
//! 5. Commit as the acting user and push
//!
//! A push is the only point where a mutation becomes real. When it is
//! rejected the working copy is left dirty; the next synchronize throws that
//! away. With `push_retries` set, a rejected mutation is re-run from step 2.
//!
//! Ownership is never stored: it is the author, date and body of the newest
//! commit that touched `<pool>/claimed/<lock>`.

mod target;
mod types;

pub use target::LockTarget;
pub use types::{LockState, LockStatus, ManagerOptions, Ownership};

use crate::error::{ClaimerError, Result};
use crate::fs::{list_dirs, list_files, move_path, remove_path, touch};
use crate::locks::acquire_workdir_lock;
use crate::store::VersionedStore;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};
use types::{CLAIMED_DIR, PLACEHOLDER, PoolLayout, UNCLAIMED_DIR};

/// Maps lock operations onto a [`VersionedStore`].
pub struct LockManager<S> {
    store: S,
    options: ManagerOptions,
    serial: Mutex<()>,
}

impl<S: VersionedStore> LockManager<S> {
    pub fn new(store: S, options: ManagerOptions) -> Self {
        Self {
            store,
            options,
            serial: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Claim `target` for `user`, returning the display name of the lock
    /// that was claimed.
    ///
    /// A non-empty `message` becomes the commit body and is reported by
    /// [`LockManager::owner`] afterwards.
    pub fn claim(&self, target: &LockTarget, user: &str, message: &str) -> Result<String> {
        self.mutate("claim", || self.try_claim(target, user, message))
    }

    /// Release `target`, returning the display name of the released lock.
    pub fn release(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.mutate("release", || self.try_release(target, user))
    }

    /// Who holds `target`. `None` when it is not claimed.
    pub fn owner(&self, target: &LockTarget) -> Result<Option<Ownership>> {
        self.exclusive("owner", || {
            self.sync()?;
            let pool = self.read_pool(target.pool())?;

            let lock = match target.lock() {
                Some(lock) if pool.contains(LockState::Claimed, lock) => lock.to_string(),
                Some(lock) if pool.contains(LockState::Unclaimed, lock) => return Ok(None),
                Some(lock) => return Err(lock_not_found(&pool.name, lock)),
                None => match pool.claimed.as_slice() {
                    [] => return Ok(None),
                    [only] => only.clone(),
                    several => {
                        return Err(ClaimerError::Integrity(format!(
                            "pool '{}' has {} claimed locks; specify one of: {}",
                            pool.name,
                            several.len(),
                            several.join(", ")
                        )));
                    }
                },
            };

            self.ownership(&pool, &lock).map(Some)
        })
    }

    /// Every lock in every pool, sorted by display name. Claimed locks carry
    /// their ownership.
    pub fn status(&self) -> Result<Vec<LockStatus>> {
        self.exclusive("status", || {
            self.sync()?;

            let root = self.store.working_directory();
            let pools =
                list_dirs(root).map_err(|e| e.context("failed to list pools"))?;

            let mut statuses = Vec::new();
            for name in pools {
                let dir = root.join(&name);
                if !is_pool_dir(&dir) {
                    debug!(dir = %dir.display(), "skipping directory without lock buckets");
                    continue;
                }
                let pool = self.read_pool(&name)?;

                for lock in &pool.claimed {
                    statuses.push(LockStatus {
                        pool: pool.name.clone(),
                        lock: lock.clone(),
                        name: pool.display_name(lock),
                        state: LockState::Claimed,
                        ownership: Some(self.ownership(&pool, lock)?),
                    });
                }
                for lock in &pool.unclaimed {
                    statuses.push(LockStatus {
                        pool: pool.name.clone(),
                        lock: lock.clone(),
                        name: pool.display_name(lock),
                        state: LockState::Unclaimed,
                        ownership: None,
                    });
                }
            }

            statuses.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(statuses)
        })
    }

    /// Create a pool holding one unclaimed lock named after it, or, for a
    /// `pool/lock` target, add one more unclaimed lock to a pool (creating
    /// the pool when needed).
    pub fn create_pool(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.mutate("create", || self.try_create(target, user))
    }

    /// Remove a whole pool, or a single lock of a `pool/lock` target.
    pub fn destroy_pool(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.mutate("destroy", || self.try_destroy(target, user))
    }

    fn try_claim(&self, target: &LockTarget, user: &str, message: &str) -> Result<String> {
        self.sync()?;
        let pool = self.read_pool(target.pool())?;

        let lock = match target.lock() {
            Some(lock) if pool.contains(LockState::Unclaimed, lock) => lock.to_string(),
            Some(lock) if pool.contains(LockState::Claimed, lock) => {
                return Err(ClaimerError::NoUnclaimedLocks(format!(
                    "{} is already claimed",
                    target
                )));
            }
            Some(lock) => return Err(lock_not_found(&pool.name, lock)),
            None => match pool.unclaimed.as_slice() {
                [] => {
                    return Err(ClaimerError::NoUnclaimedLocks(format!(
                        "no unclaimed locks in pool '{}'",
                        pool.name
                    )));
                }
                [only] => only.clone(),
                [first, ..] if !self.options.require_explicit_lock => first.clone(),
                several => {
                    return Err(ClaimerError::Integrity(format!(
                        "pool '{}' has {} unclaimed locks; specify one of: {}",
                        pool.name,
                        several.len(),
                        several.join(", ")
                    )));
                }
            },
        };

        let name = pool.display_name(&lock);
        move_path(
            pool.path(LockState::Unclaimed, &lock),
            pool.path(LockState::Claimed, &lock),
        )
        .map_err(|e| e.context("failed to move lock file"))?;

        self.publish(&commit_message("Claiming", &name, message), user)?;
        info!(lock = %name, user, "claimed lock");
        Ok(name)
    }

    fn try_release(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.sync()?;
        let pool = self.read_pool(target.pool())?;

        let lock = match target.lock() {
            Some(lock) if pool.contains(LockState::Claimed, lock) => lock.to_string(),
            Some(lock) if pool.contains(LockState::Unclaimed, lock) => {
                return Err(ClaimerError::NoClaimedLocks(format!(
                    "{} is not claimed",
                    target
                )));
            }
            Some(lock) => return Err(lock_not_found(&pool.name, lock)),
            None => match pool.claimed.as_slice() {
                [] => {
                    return Err(ClaimerError::NoClaimedLocks(format!(
                        "no claimed locks in pool '{}'",
                        pool.name
                    )));
                }
                [only] => only.clone(),
                several => {
                    return Err(ClaimerError::Integrity(format!(
                        "pool '{}' has {} claimed locks; specify one of: {}",
                        pool.name,
                        several.len(),
                        several.join(", ")
                    )));
                }
            },
        };

        let name = pool.display_name(&lock);
        move_path(
            pool.path(LockState::Claimed, &lock),
            pool.path(LockState::Unclaimed, &lock),
        )
        .map_err(|e| e.context("failed to move lock file"))?;

        self.publish(&commit_message("Releasing", &name, ""), user)?;
        info!(lock = %name, user, "released lock");
        Ok(name)
    }

    fn try_create(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.sync()?;
        let dir = self.pool_dir(target.pool());

        if dir.exists() && !is_pool_dir(&dir) {
            return Err(ClaimerError::NotAPool(format!(
                "'{}' already exists and is not a pool",
                target.pool()
            )));
        }

        match target.lock() {
            None if dir.exists() => {
                return Err(ClaimerError::AlreadyExists(format!(
                    "pool '{}' already exists",
                    target.pool()
                )));
            }
            Some(lock) if dir.exists() => {
                let pool = self.read_pool(target.pool())?;
                if pool.contains(LockState::Claimed, lock)
                    || pool.contains(LockState::Unclaimed, lock)
                {
                    return Err(ClaimerError::AlreadyExists(format!(
                        "lock '{}' already exists",
                        target
                    )));
                }
            }
            _ => {}
        }

        let lock = target.lock().unwrap_or(target.pool());
        let files = [
            dir.join(CLAIMED_DIR).join(PLACEHOLDER),
            dir.join(UNCLAIMED_DIR).join(PLACEHOLDER),
            dir.join(UNCLAIMED_DIR).join(lock),
        ];
        for file in &files {
            touch(file).map_err(|e| e.context("failed to create lock files"))?;
        }

        let name = target.to_string();
        self.publish(&commit_message("Creating", &name, ""), user)?;
        info!(target = %name, user, "created lock");
        Ok(name)
    }

    fn try_destroy(&self, target: &LockTarget, user: &str) -> Result<String> {
        self.sync()?;
        let pool = self.read_pool(target.pool())?;

        let path = match target.lock() {
            None => pool.dir.clone(),
            Some(lock) if pool.contains(LockState::Claimed, lock) => {
                pool.path(LockState::Claimed, lock)
            }
            Some(lock) if pool.contains(LockState::Unclaimed, lock) => {
                pool.path(LockState::Unclaimed, lock)
            }
            Some(lock) => return Err(lock_not_found(&pool.name, lock)),
        };
        remove_path(&path).map_err(|e| e.context("failed to remove lock files"))?;

        let name = target.to_string();
        self.publish(&commit_message("Destroying", &name, ""), user)?;
        info!(target = %name, user, "destroyed lock");
        Ok(name)
    }

    /// Run `op` with exclusive use of the working copy.
    fn exclusive<T>(&self, action: &str, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let _serial = self.serial.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = acquire_workdir_lock(
            self.store.working_directory(),
            action,
            self.options.stale_lock_minutes,
        )?;
        op()
    }

    /// Run a mutating attempt, re-running it on a rejected push while
    /// retries remain.
    fn mutate<T>(&self, action: &str, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        let max_retries = self.options.push_retries;
        self.exclusive(action, || {
            let mut retries = 0;
            loop {
                match attempt() {
                    Err(ClaimerError::Push(detail)) if retries < max_retries => {
                        retries += 1;
                        warn!(
                            action,
                            retry = retries,
                            max_retries,
                            error = %detail,
                            "push rejected, retrying from a fresh sync"
                        );
                    }
                    result => return result,
                }
            }
        })
    }

    fn sync(&self) -> Result<()> {
        self.store
            .synchronize()
            .map_err(|e| e.context("failed to synchronize repository"))
    }

    fn publish(&self, message: &str, user: &str) -> Result<()> {
        self.store
            .commit_and_push(message, user)
            .map_err(|e| e.context("failed to commit and push"))
    }

    fn pool_dir(&self, pool: &str) -> PathBuf {
        self.store.working_directory().join(pool)
    }

    fn read_pool(&self, name: &str) -> Result<PoolLayout> {
        let dir = self.pool_dir(name);
        if !is_pool_dir(&dir) {
            return Err(ClaimerError::NotFound(format!(
                "pool '{}' does not exist",
                name
            )));
        }

        let claimed = list_bucket(&dir.join(CLAIMED_DIR))
            .map_err(|e| e.context("failed to list claimed locks"))?;
        let unclaimed = list_bucket(&dir.join(UNCLAIMED_DIR))
            .map_err(|e| e.context("failed to list unclaimed locks"))?;

        Ok(PoolLayout {
            name: name.to_string(),
            dir,
            claimed,
            unclaimed,
        })
    }

    fn ownership(&self, pool: &PoolLayout, lock: &str) -> Result<Ownership> {
        self.store
            .latest_commit(&pool.relative_path(LockState::Claimed, lock))
            .map(Ownership::from)
            .map_err(|e| e.context("failed to get latest commit"))
    }
}

fn is_pool_dir(dir: &Path) -> bool {
    dir.join(CLAIMED_DIR).is_dir() || dir.join(UNCLAIMED_DIR).is_dir()
}

/// Files in a bucket; a bucket git dropped because it was empty has none.
fn list_bucket(dir: &Path) -> Result<Vec<String>> {
    if dir.is_dir() {
        list_files(dir)
    } else {
        Ok(Vec::new())
    }
}

fn lock_not_found(pool: &str, lock: &str) -> ClaimerError {
    ClaimerError::NotFound(format!("lock '{}/{}' does not exist", pool, lock))
}

fn commit_message(verb: &str, name: &str, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("{} {}", verb, name)
    } else {
        format!("{} {}\n\n{}", verb, name, body)
    }
}
