//! Turning chat text into a [`ChatCommand`].

/// A chat command with its raw arguments.
///
/// Targets stay unparsed here; a missing or malformed target is answered
/// with a reply, not rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Claim {
        target: Option<String>,
        /// Free text after the target; becomes the claim commit body.
        message: String,
    },
    Release {
        target: Option<String>,
    },
    Owner {
        target: Option<String>,
    },
    Status,
    Create {
        target: Option<String>,
    },
    Destroy {
        target: Option<String>,
    },
    Notify,
    Help,
    /// Anything else, holding the unrecognized verb (empty for blank text).
    Unknown(String),
}

impl ChatCommand {
    /// Parse `text`, ignoring a leading mention of the bot (`@claimer` or
    /// `<@U123>`).
    pub fn parse(text: &str) -> Self {
        let mut words = tokenize(text);
        if words.first().is_some_and(|w| is_mention(w)) {
            words.remove(0);
        }

        let Some(verb) = words.first() else {
            return ChatCommand::Unknown(String::new());
        };
        let target = words.get(1).cloned();

        match verb.to_lowercase().as_str() {
            "claim" => ChatCommand::Claim {
                target,
                message: words.get(2..).unwrap_or_default().join(" "),
            },
            "release" => ChatCommand::Release { target },
            "owner" => ChatCommand::Owner { target },
            "status" => ChatCommand::Status,
            "create" => ChatCommand::Create { target },
            "destroy" => ChatCommand::Destroy { target },
            "notify" => ChatCommand::Notify,
            "help" => ChatCommand::Help,
            _ => ChatCommand::Unknown(verb.clone()),
        }
    }

    /// The verb, for logging.
    pub fn verb(&self) -> &str {
        match self {
            ChatCommand::Claim { .. } => "claim",
            ChatCommand::Release { .. } => "release",
            ChatCommand::Owner { .. } => "owner",
            ChatCommand::Status => "status",
            ChatCommand::Create { .. } => "create",
            ChatCommand::Destroy { .. } => "destroy",
            ChatCommand::Notify => "notify",
            ChatCommand::Help => "help",
            ChatCommand::Unknown(verb) => verb,
        }
    }
}

/// Shell-style split so quoted claim messages stay one argument. Free text
/// with a stray apostrophe does not parse as shell syntax; split on
/// whitespace then.
fn tokenize(text: &str) -> Vec<String> {
    shell_words::split(text)
        .unwrap_or_else(|_| text.split_whitespace().map(str::to_string).collect())
}

fn is_mention(word: &str) -> bool {
    word.starts_with('@') || (word.starts_with("<@") && word.ends_with('>'))
}
