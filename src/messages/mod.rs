//! Reply templates for chat commands.
//!
//! Every reply the bot sends comes from a [`Messages`] value. The defaults
//! are built in; a YAML file named by `messages_file` can override any subset
//! of them. A `Messages` value is immutable once loaded and is passed to the
//! command layer explicitly.
//!
//! ```yaml
//! claim:
//!   success: "Grabbed {pool}, have fun"
//! unknown_command: "Say `help` to see what I can do."
//! ```

mod template;

pub use template::{TemplateError, render_template};

use crate::error::{ClaimerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Replies for `claim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimMessages {
    pub success: String,
    pub already_claimed: String,
    pub does_not_exist: String,
    pub not_specified: String,
}

impl Default for ClaimMessages {
    fn default() -> Self {
        Self {
            success: "Claimed {pool}".to_string(),
            already_claimed: "{pool} is already claimed".to_string(),
            does_not_exist: "{pool} does not exist".to_string(),
            not_specified: "must specify lock to claim".to_string(),
        }
    }
}

/// Replies for `release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseMessages {
    pub success: String,
    pub not_claimed: String,
    pub does_not_exist: String,
    pub not_specified: String,
}

impl Default for ReleaseMessages {
    fn default() -> Self {
        Self {
            success: "Released {pool}".to_string(),
            not_claimed: "{pool} is not claimed".to_string(),
            does_not_exist: "{pool} does not exist".to_string(),
            not_specified: "must specify pool to release".to_string(),
        }
    }
}

/// Replies for `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerMessages {
    pub success: String,
    /// Used instead of `success` when the claim carried a message.
    pub success_with_message: String,
    pub not_claimed: String,
    pub does_not_exist: String,
    pub not_specified: String,
}

impl Default for OwnerMessages {
    fn default() -> Self {
        Self {
            success: "{pool} was claimed by {owner} on {date}".to_string(),
            success_with_message: "{pool} was claimed by {owner} on {date} ({message})"
                .to_string(),
            not_claimed: "{pool} is not claimed".to_string(),
            does_not_exist: "{pool} does not exist".to_string(),
            not_specified: "must specify pool".to_string(),
        }
    }
}

/// Replies for `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateMessages {
    pub success: String,
    pub already_exists: String,
    /// The name belongs to a root directory or file that holds no locks.
    pub not_a_pool: String,
    pub not_specified: String,
}

impl Default for CreateMessages {
    fn default() -> Self {
        Self {
            success: "Created {pool}".to_string(),
            already_exists: "{pool} already exists".to_string(),
            not_a_pool: "{pool} already exists in the repository but is not a pool".to_string(),
            not_specified: "must specify name of pool to create".to_string(),
        }
    }
}

/// Replies for `destroy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestroyMessages {
    pub success: String,
    pub does_not_exist: String,
    pub not_specified: String,
}

impl Default for DestroyMessages {
    fn default() -> Self {
        Self {
            success: "Destroyed {pool}".to_string(),
            does_not_exist: "{pool} does not exist".to_string(),
            not_specified: "must specify pool to destroy".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMessages {
    pub success: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            success: "*Claimed by you:* {own}\n*Claimed by others:* {others}\n*Unclaimed:* {unclaimed}"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyMessages {
    pub success: String,
    pub none_claimed: String,
}

impl Default for NotifyMessages {
    fn default() -> Self {
        Self {
            success: "Currently claimed locks, please release if not in use:\n{mentions}"
                .to_string(),
            none_claimed: "No locks currently claimed.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpMessages {
    pub header: String,
    pub body: String,
}

impl Default for HelpMessages {
    fn default() -> Self {
        Self {
            header: "Available commands:\n".to_string(),
            body: concat!(
                "```\n",
                "  claim <env> [<message>]   Claim an unclaimed environment\n",
                "  create <env>              Create a new environment\n",
                "  destroy <env>             Destroy an environment\n",
                "  notify                    Notify all users with claimed environments\n",
                "  owner <env>               Show the user who claimed the environment\n",
                "  release <env>             Release a claimed environment\n",
                "  status                    Show claimed and unclaimed environments\n",
                "  help                      Display this message\n",
                "```"
            )
            .to_string(),
        }
    }
}

/// The full set of reply templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub claim: ClaimMessages,
    pub release: ReleaseMessages,
    pub owner: OwnerMessages,
    pub create: CreateMessages,
    pub destroy: DestroyMessages,
    pub status: StatusMessages,
    pub notify: NotifyMessages,
    pub help: HelpMessages,
    /// A bare pool name matched several locks; `{pool}` is the typed name.
    pub ambiguous: String,
    pub invalid_name: String,
    pub unknown_command: String,
    /// Sent for an infrastructure failure when `reply_on_error` is set.
    pub failure: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            claim: ClaimMessages::default(),
            release: ReleaseMessages::default(),
            owner: OwnerMessages::default(),
            create: CreateMessages::default(),
            destroy: DestroyMessages::default(),
            status: StatusMessages::default(),
            notify: NotifyMessages::default(),
            help: HelpMessages::default(),
            ambiguous: "{pool} has more than one lock, specify one as {pool}/<lock>".to_string(),
            invalid_name: "{name} is not a valid name".to_string(),
            unknown_command: "Unknown command. Try `@claimer help` to see usage.".to_string(),
            failure: "Something went wrong, check the claimer logs.".to_string(),
        }
    }
}

impl Messages {
    /// Load templates from a YAML file, layered over the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ClaimerError::UserError(format!(
                "failed to read messages file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
            .map_err(|e| e.context(&format!("messages file '{}'", path.display())))
    }

    /// Parse and validate templates from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let messages: Self = serde_yaml::from_str(yaml).map_err(|e| {
            ClaimerError::UserError(format!("failed to parse messages YAML: {}", e))
        })?;
        messages.validate()?;
        Ok(messages)
    }

    /// Check that every template only uses the placeholders its reply
    /// supplies.
    pub fn validate(&self) -> Result<()> {
        const POOL: &[&str] = &["pool"];
        const NONE: &[&str] = &[];

        let templates: [(&str, &str, &[&str]); 27] = [
            ("claim.success", &self.claim.success, POOL),
            ("claim.already_claimed", &self.claim.already_claimed, POOL),
            ("claim.does_not_exist", &self.claim.does_not_exist, POOL),
            ("claim.not_specified", &self.claim.not_specified, NONE),
            ("release.success", &self.release.success, POOL),
            ("release.not_claimed", &self.release.not_claimed, POOL),
            ("release.does_not_exist", &self.release.does_not_exist, POOL),
            ("release.not_specified", &self.release.not_specified, NONE),
            ("owner.success", &self.owner.success, &["pool", "owner", "date"]),
            (
                "owner.success_with_message",
                &self.owner.success_with_message,
                &["pool", "owner", "date", "message"],
            ),
            ("owner.not_claimed", &self.owner.not_claimed, POOL),
            ("owner.does_not_exist", &self.owner.does_not_exist, POOL),
            ("owner.not_specified", &self.owner.not_specified, NONE),
            ("create.success", &self.create.success, POOL),
            ("create.already_exists", &self.create.already_exists, POOL),
            ("create.not_a_pool", &self.create.not_a_pool, POOL),
            ("create.not_specified", &self.create.not_specified, NONE),
            ("destroy.success", &self.destroy.success, POOL),
            ("destroy.does_not_exist", &self.destroy.does_not_exist, POOL),
            ("destroy.not_specified", &self.destroy.not_specified, NONE),
            ("status.success", &self.status.success, &["own", "others", "unclaimed"]),
            ("notify.success", &self.notify.success, &["mentions"]),
            ("notify.none_claimed", &self.notify.none_claimed, NONE),
            ("help.header", &self.help.header, NONE),
            ("help.body", &self.help.body, NONE),
            ("ambiguous", &self.ambiguous, POOL),
            ("invalid_name", &self.invalid_name, &["name"]),
        ];

        for (key, template, allowed) in templates {
            let vars: HashMap<&str, &str> = allowed.iter().map(|name| (*name, "")).collect();
            render_template(template, &vars).map_err(|e| {
                ClaimerError::UserError(format!("invalid template '{}': {}", key, e))
            })?;
        }

        for (key, template) in [
            ("unknown_command", &self.unknown_command),
            ("failure", &self.failure),
        ] {
            render_template(template, &HashMap::new()).map_err(|e| {
                ClaimerError::UserError(format!("invalid template '{}': {}", key, e))
            })?;
        }

        Ok(())
    }
}

/// Render a reply template with the given placeholder values.
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    render_template(template, &vars)
        .map_err(|e| ClaimerError::UserError(format!("invalid reply template: {}", e)))
}
