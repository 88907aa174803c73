use super::TargetArg;
use crate::error::{ClaimerError, Result};
use crate::locker::LockManager;
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

pub(super) fn cmd_destroy<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
    arg: Option<&str>,
    user: &str,
) -> Result<String> {
    let replies = &messages.destroy;
    let target = match TargetArg::parse(arg, &replies.not_specified, messages)? {
        TargetArg::Valid(target) => target,
        TargetArg::Reply(reply) => return Ok(reply),
    };

    match manager.destroy_pool(&target, user) {
        Ok(name) => render(&replies.success, &[("pool", &name)]),
        Err(ClaimerError::NotFound(_)) => {
            render(&replies.does_not_exist, &[("pool", &target.to_string())])
        }
        Err(e) => Err(e),
    }
}
