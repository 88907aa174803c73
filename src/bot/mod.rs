//! The chat loop: receive a message, run it, post the reply.
//!
//! Messages are handled strictly one at a time in delivery order. A command
//! that fails with an infrastructure error is logged; the user only hears
//! about it when `reply_on_error` is set.

mod line;

pub use line::LineTransport;

use crate::commands::{ChatCommand, Dispatcher};
use crate::error::Result;
use crate::messages::render;
use crate::store::VersionedStore;
use tracing::{debug, error};

/// One chat message addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub text: String,
    pub channel: String,
    pub user: String,
}

/// Source of chat messages and sink for replies.
pub trait Transport {
    /// The next message, or `None` once the transport is closed.
    fn next_message(&mut self) -> Result<Option<IncomingMessage>>;

    fn post_message(&mut self, channel: &str, text: &str) -> Result<()>;
}

pub struct Bot<S, T> {
    dispatcher: Dispatcher<S>,
    transport: T,
    reply_on_error: bool,
}

impl<S: VersionedStore, T: Transport> Bot<S, T> {
    pub fn new(dispatcher: Dispatcher<S>, transport: T, reply_on_error: bool) -> Self {
        Self {
            dispatcher,
            transport,
            reply_on_error,
        }
    }

    /// Handle messages until the transport closes.
    ///
    /// Only a failure to receive ends the loop early; command and posting
    /// failures are logged and the loop moves on.
    pub fn run(&mut self) -> Result<()> {
        while let Some(message) = self.transport.next_message()? {
            self.handle_message(&message);
        }
        debug!("transport closed");
        Ok(())
    }

    fn handle_message(&mut self, message: &IncomingMessage) {
        let command = ChatCommand::parse(&message.text);
        debug!(
            command = command.verb(),
            channel = %message.channel,
            user = %message.user,
            "handling message"
        );

        let reply = match self.dispatcher.execute(&command, &message.user) {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!(
                    command = command.verb(),
                    error = %e,
                    text = %message.text,
                    channel = %message.channel,
                    user = %message.user,
                    "failed to handle message"
                );
                if self.reply_on_error {
                    render(&self.dispatcher.messages().failure, &[]).ok()
                } else {
                    None
                }
            }
        };

        let Some(reply) = reply else {
            return;
        };
        if let Err(e) = self.transport.post_message(&message.channel, &reply) {
            error!(
                error = %e,
                channel = %message.channel,
                user = %message.user,
                "failed to post reply"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClaimerError;
    use crate::locker::{LockManager, ManagerOptions};
    use crate::messages::Messages;
    use crate::store::GitRepo;
    use crate::test_support::TestRemote;
    use std::collections::VecDeque;

    /// In-memory transport recording every reply.
    #[derive(Default)]
    struct FakeTransport {
        inbox: VecDeque<IncomingMessage>,
        posted: Vec<(String, String)>,
        fail_posts: bool,
    }

    impl FakeTransport {
        fn with_messages(messages: &[(&str, &str, &str)]) -> Self {
            Self {
                inbox: messages
                    .iter()
                    .map(|(text, channel, user)| IncomingMessage {
                        text: text.to_string(),
                        channel: channel.to_string(),
                        user: user.to_string(),
                    })
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl Transport for FakeTransport {
        fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
            Ok(self.inbox.pop_front())
        }

        fn post_message(&mut self, channel: &str, text: &str) -> Result<()> {
            if self.fail_posts {
                return Err(ClaimerError::Io("connection reset".to_string()));
            }
            self.posted.push((channel.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn dispatcher(url: &str, remote: &TestRemote) -> Dispatcher<GitRepo> {
        Dispatcher::new(
            LockManager::new(
                GitRepo::new(url, remote.work_dir("locks")),
                ManagerOptions::default(),
            ),
            Messages::default(),
        )
    }

    #[test]
    fn replies_in_order_on_the_sending_channel() {
        let remote = TestRemote::new();
        let transport = FakeTransport::with_messages(&[
            ("@claimer create p1", "C1", "alice"),
            ("@claimer claim p1", "C2", "alice"),
            ("@claimer claim p1", "C1", "bob"),
        ]);
        let mut bot = Bot::new(dispatcher(&remote.url, &remote), transport, false);

        bot.run().unwrap();

        assert_eq!(
            bot.transport.posted,
            [
                ("C1".to_string(), "Created p1".to_string()),
                ("C2".to_string(), "Claimed p1".to_string()),
                ("C1".to_string(), "p1 is already claimed".to_string()),
            ]
        );
    }

    #[test]
    fn failures_are_silent_by_default() {
        let remote = TestRemote::new();
        let missing = remote.work_dir("missing.git").to_string_lossy().to_string();
        let transport = FakeTransport::with_messages(&[
            ("status", "C1", "alice"),
            ("help", "C1", "alice"),
        ]);
        let mut bot = Bot::new(dispatcher(&missing, &remote), transport, false);

        bot.run().unwrap();

        let posted = &bot.transport.posted;
        assert_eq!(posted.len(), 1);
        assert!(posted[0].1.starts_with("Available commands:"));
    }

    #[test]
    fn failures_get_generic_reply_when_enabled() {
        let remote = TestRemote::new();
        let missing = remote.work_dir("missing.git").to_string_lossy().to_string();
        let transport = FakeTransport::with_messages(&[("status", "C1", "alice")]);
        let mut bot = Bot::new(dispatcher(&missing, &remote), transport, true);

        bot.run().unwrap();

        assert_eq!(
            bot.transport.posted,
            [(
                "C1".to_string(),
                Messages::default().failure
            )]
        );
    }

    #[test]
    fn post_failures_do_not_stop_the_loop() {
        let remote = TestRemote::new();
        let mut transport = FakeTransport::with_messages(&[
            ("create p1", "C1", "alice"),
            ("claim p1", "C1", "alice"),
        ]);
        transport.fail_posts = true;
        let mut bot = Bot::new(dispatcher(&remote.url, &remote), transport, false);

        bot.run().unwrap();

        assert!(remote.has_file("p1/claimed/p1"));
        assert!(bot.transport.inbox.is_empty());
    }
}
