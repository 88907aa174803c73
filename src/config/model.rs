//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a claimer instance.
///
/// This struct represents the contents of `claimer.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Repository settings
    // =========================================================================
    /// URL (or local path) of the shared lock repository.
    pub repo_url: String,

    /// Local working copy. Disposable; resynchronized before every operation.
    pub working_dir: PathBuf,

    /// Name of the remote (default: "origin").
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch holding lock state (default: "main").
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Private SSH key used for clone/fetch/push, if the remote needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_key_path: Option<PathBuf>,

    /// Committer name on every lock commit. The author is the acting user.
    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    /// Committer email on every lock commit.
    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Extra attempts for a mutation whose push was rejected (0 = surface the
    /// conflict immediately).
    pub push_retries: u32,

    /// Refuse to claim a bare pool name when several of its locks are free.
    pub require_explicit_lock: bool,

    /// Minutes after which a leftover working-directory lock is taken over
    /// even if its process may still run (0 = only when the process is gone).
    #[serde(default = "default_stale_lock_minutes")]
    pub stale_lock_minutes: u32,

    // =========================================================================
    // Chat settings
    // =========================================================================
    /// Post a generic failure reply when a command hits an infrastructure error.
    pub reply_on_error: bool,

    /// YAML file overriding reply templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            working_dir: PathBuf::new(),
            remote: default_remote(),
            branch: default_branch(),
            deploy_key_path: None,
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            push_retries: 0,
            require_explicit_lock: false,
            stale_lock_minutes: default_stale_lock_minutes(),
            reply_on_error: false,
            messages_file: None,
        }
    }
}
