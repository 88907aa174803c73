use super::TargetArg;
use crate::error::{ClaimerError, Result};
use crate::locker::LockManager;
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

pub(super) fn cmd_release<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
    arg: Option<&str>,
    user: &str,
) -> Result<String> {
    let replies = &messages.release;
    let target = match TargetArg::parse(arg, &replies.not_specified, messages)? {
        TargetArg::Valid(target) => target,
        TargetArg::Reply(reply) => return Ok(reply),
    };
    let pool = target.to_string();

    match manager.release(&target, user) {
        Ok(name) => render(&replies.success, &[("pool", &name)]),
        Err(ClaimerError::NoClaimedLocks(_)) => render(&replies.not_claimed, &[("pool", &pool)]),
        Err(ClaimerError::NotFound(_)) => render(&replies.does_not_exist, &[("pool", &pool)]),
        Err(ClaimerError::Integrity(_)) => render(&messages.ambiguous, &[("pool", &pool)]),
        Err(e) => Err(e),
    }
}
