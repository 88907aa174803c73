//! Error types for claimer.
//!
//! Uses thiserror for derive macros. Every variant carries a human-readable
//! message so a failing step can be wrapped with context without losing the
//! error kind callers match on.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for claimer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimerError {
    /// User provided invalid arguments, configuration, or lock names.
    #[error("{0}")]
    UserError(String),

    /// A git subprocess failed before the caller categorized the failure.
    #[error("Git operation failed: {0}")]
    Git(String),

    /// The local working copy could not be cloned, fetched, or reset.
    #[error("{0}")]
    Sync(String),

    /// Staging or committing failed (including "nothing to commit").
    #[error("{0}")]
    Commit(String),

    /// The push was rejected or could not reach the remote.
    #[error("{0}")]
    Push(String),

    /// The history query for a path failed or found no commits.
    #[error("{0}")]
    History(String),

    /// The pool (or named lock) has no unclaimed lock to claim.
    #[error("{0}")]
    NoUnclaimedLocks(String),

    /// The pool (or named lock) has no claimed lock to release.
    #[error("{0}")]
    NoClaimedLocks(String),

    /// Zero or several candidates where exactly one was expected.
    #[error("{0}")]
    Integrity(String),

    /// A pool with the requested name already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// The pool or lock does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A root entry without lock buckets occupies the pool name.
    #[error("{0}")]
    NotAPool(String),

    /// Local filesystem failure.
    #[error("{0}")]
    Io(String),

    /// The working directory lock is held by someone else.
    #[error("Lock acquisition failed: {0}")]
    Locked(String),
}

impl ClaimerError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClaimerError::UserError(_)
            | ClaimerError::NoUnclaimedLocks(_)
            | ClaimerError::NoClaimedLocks(_)
            | ClaimerError::Integrity(_)
            | ClaimerError::AlreadyExists(_)
            | ClaimerError::NotFound(_)
            | ClaimerError::NotAPool(_) => exit_codes::USER_ERROR,
            ClaimerError::Push(_) => exit_codes::PUSH_CONFLICT,
            ClaimerError::Git(_)
            | ClaimerError::Sync(_)
            | ClaimerError::Commit(_)
            | ClaimerError::History(_) => exit_codes::GIT_FAILURE,
            ClaimerError::Locked(_) => exit_codes::LOCK_FAILURE,
            ClaimerError::Io(_) => exit_codes::IO_FAILURE,
        }
    }

    /// The message carried by this error, without any variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            ClaimerError::UserError(m)
            | ClaimerError::Git(m)
            | ClaimerError::Sync(m)
            | ClaimerError::Commit(m)
            | ClaimerError::Push(m)
            | ClaimerError::History(m)
            | ClaimerError::NoUnclaimedLocks(m)
            | ClaimerError::NoClaimedLocks(m)
            | ClaimerError::Integrity(m)
            | ClaimerError::AlreadyExists(m)
            | ClaimerError::NotFound(m)
            | ClaimerError::NotAPool(m)
            | ClaimerError::Io(m)
            | ClaimerError::Locked(m) => m,
        }
    }

    /// Prefix the message with the step that failed, keeping the variant.
    ///
    /// `Io("permission denied").context("failed to move lock file")` becomes
    /// `Io("failed to move lock file: permission denied")`.
    pub fn context(self, step: &str) -> Self {
        let wrap = |m: String| format!("{}: {}", step, m);
        match self {
            ClaimerError::UserError(m) => ClaimerError::UserError(wrap(m)),
            ClaimerError::Git(m) => ClaimerError::Git(wrap(m)),
            ClaimerError::Sync(m) => ClaimerError::Sync(wrap(m)),
            ClaimerError::Commit(m) => ClaimerError::Commit(wrap(m)),
            ClaimerError::Push(m) => ClaimerError::Push(wrap(m)),
            ClaimerError::History(m) => ClaimerError::History(wrap(m)),
            ClaimerError::NoUnclaimedLocks(m) => ClaimerError::NoUnclaimedLocks(wrap(m)),
            ClaimerError::NoClaimedLocks(m) => ClaimerError::NoClaimedLocks(wrap(m)),
            ClaimerError::Integrity(m) => ClaimerError::Integrity(wrap(m)),
            ClaimerError::AlreadyExists(m) => ClaimerError::AlreadyExists(wrap(m)),
            ClaimerError::NotFound(m) => ClaimerError::NotFound(wrap(m)),
            ClaimerError::NotAPool(m) => ClaimerError::NotAPool(wrap(m)),
            ClaimerError::Io(m) => ClaimerError::Io(wrap(m)),
            ClaimerError::Locked(m) => ClaimerError::Locked(wrap(m)),
        }
    }
}

/// Result type alias for claimer operations.
pub type Result<T> = std::result::Result<T, ClaimerError>;
