//! Exit code constants for the claimer CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, invalid names, "already claimed" and
//!   other negative outcomes of one-shot commands)
//! - 2: Push conflict (the remote advanced underneath us)
//! - 3: Git failure (sync, commit, history)
//! - 4: Working directory is locked by another process
//! - 5: Local filesystem failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or an invalid lock name.
pub const USER_ERROR: i32 = 1;

/// The push was rejected because the remote moved on.
pub const PUSH_CONFLICT: i32 = 2;

/// Git operation failure: clone, fetch, reset, commit or log errors.
pub const GIT_FAILURE: i32 = 3;

/// The working directory lock could not be acquired.
pub const LOCK_FAILURE: i32 = 4;

/// Local filesystem operation failed.
pub const IO_FAILURE: i32 = 5;
