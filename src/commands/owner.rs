use super::TargetArg;
use crate::error::{ClaimerError, Result};
use crate::locker::{LockManager, Ownership};
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

pub(super) fn cmd_owner<S: VersionedStore>(
    manager: &LockManager<S>,
    messages: &Messages,
    arg: Option<&str>,
) -> Result<String> {
    let replies = &messages.owner;
    let target = match TargetArg::parse(arg, &replies.not_specified, messages)? {
        TargetArg::Valid(target) => target,
        TargetArg::Reply(reply) => return Ok(reply),
    };
    let pool = target.to_string();

    match manager.owner(&target) {
        Ok(Some(ownership)) => owner_reply(messages, &pool, &ownership),
        Ok(None) => render(&replies.not_claimed, &[("pool", &pool)]),
        Err(ClaimerError::NotFound(_)) => render(&replies.does_not_exist, &[("pool", &pool)]),
        Err(ClaimerError::Integrity(_)) => render(&messages.ambiguous, &[("pool", &pool)]),
        Err(e) => Err(e),
    }
}

/// `{pool} was claimed by {owner} on {date}`, with the claim message when
/// there is one.
pub(crate) fn owner_reply(messages: &Messages, pool: &str, ownership: &Ownership) -> Result<String> {
    let date = ownership.display_date();
    let mut vars = vec![
        ("pool", pool),
        ("owner", ownership.owner.as_str()),
        ("date", date.as_str()),
    ];
    if ownership.message.is_empty() {
        render(&messages.owner.success, &vars)
    } else {
        vars.push(("message", ownership.message.as_str()));
        render(&messages.owner.success_with_message, &vars)
    }
}
