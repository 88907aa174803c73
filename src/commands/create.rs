use super::TargetArg;
use crate::error::{ClaimerError, Result};
use crate::locker::LockManager;
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

pub(super) fn cmd_create<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
    arg: Option<&str>,
    user: &str,
) -> Result<String> {
    let replies = &messages.create;
    let target = match TargetArg::parse(arg, &replies.not_specified, messages)? {
        TargetArg::Valid(target) => target,
        TargetArg::Reply(reply) => return Ok(reply),
    };

    match manager.create_pool(&target, user) {
        Ok(name) => render(&replies.success, &[("pool", &name)]),
        Err(ClaimerError::AlreadyExists(_)) => {
            render(&replies.already_exists, &[("pool", &target.to_string())])
        }
        Err(ClaimerError::NotAPool(_)) => render(&replies.not_a_pool, &[("pool", target.pool())]),
        Err(e) => Err(e),
    }
}
