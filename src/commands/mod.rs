//! Chat command handlers.
//!
//! A [`Dispatcher`] turns one chat message into one reply. Expected
//! outcomes ("already claimed", "does not exist", a missing argument) are
//! rendered as ordinary replies from [`Messages`]; only infrastructure
//! failures come back as `Err`.

mod claim;
mod create;
mod destroy;
mod notify;
mod owner;
mod parse;
mod release;
mod status;
#[cfg(test)]
mod tests;

pub(crate) use owner::owner_reply;
pub use parse::ChatCommand;

use crate::error::{ClaimerError, Result};
use crate::locker::{LockManager, LockTarget};
use crate::messages::{Messages, render};
use crate::store::VersionedStore;

/// Routes parsed commands to the lock manager and renders replies.
pub struct Dispatcher<S> {
    manager: LockManager<S>,
    messages: Messages,
}

impl<S: VersionedStore> Dispatcher<S> {
    pub fn new(manager: LockManager<S>, messages: Messages) -> Self {
        Self { manager, messages }
    }

    pub fn manager(&self) -> &LockManager<S> {
        &self.manager
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }


    /// Execute `command` on behalf of `user` and return the reply.
    pub fn execute(&self, command: &ChatCommand, user: &str) -> Result<String> {
        let manager = &self.manager;
        let messages = &self.messages;

        match command {
            ChatCommand::Claim { target, message } => {
                claim::cmd_claim(manager, messages, target.as_deref(), user, message)
            }
            ChatCommand::Release { target } => {
                release::cmd_release(manager, messages, target.as_deref(), user)
            }
            ChatCommand::Owner { target } => owner::cmd_owner(manager, messages, target.as_deref()),
            ChatCommand::Status => status::cmd_status(manager, messages, user),
            ChatCommand::Create { target } => {
                create::cmd_create(manager, messages, target.as_deref(), user)
            }
            ChatCommand::Destroy { target } => {
                destroy::cmd_destroy(manager, messages, target.as_deref(), user)
            }
            ChatCommand::Notify => notify::cmd_notify(manager, messages),
            ChatCommand::Help => Ok(format!(
                "{}{}",
                render(&messages.help.header, &[])?,
                render(&messages.help.body, &[])?
            )),
            ChatCommand::Unknown(_) => render(&messages.unknown_command, &[]),
        }
    }
}

/// A command's target argument, or the reply to send instead.
enum TargetArg {
    Valid(LockTarget),
    Reply(String),
}

impl TargetArg {
    fn parse(arg: Option<&str>, not_specified: &str, messages: &Messages) -> Result<Self> {
        let Some(arg) = arg else {
            return render(not_specified, &[]).map(TargetArg::Reply);
        };
        match LockTarget::parse(arg) {
            Ok(target) => Ok(TargetArg::Valid(target)),
            Err(ClaimerError::UserError(_)) => {
                render(&messages.invalid_name, &[("name", arg)]).map(TargetArg::Reply)
            }
            Err(e) => Err(e),
        }
    }
}
