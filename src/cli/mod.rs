//! CLI argument parsing for claimer.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Global flags override values from the config file; the subcommand picks
//! one lock operation, or `listen` to serve chat commands line by line.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Claimer: claim and release shared environments, with a git repository as
/// the lock store.
///
/// Each pool is a directory holding `claimed/` and `unclaimed/`; a lock is a
/// file in one of them. Every claim and release is a commit pushed to the
/// shared remote, and ownership is read back from history.
#[derive(Parser, Debug)]
#[command(name = "claimer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to the YAML config file.
    #[arg(long, global = true, env = "CLAIMER_CONFIG")]
    pub config: Option<PathBuf>,

    /// URL of the shared lock repository (overrides config).
    #[arg(long, global = true)]
    pub repo_url: Option<String>,

    /// Local working copy (overrides config).
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    /// Branch holding lock state (overrides config).
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Acting user; falls back to $USER.
    #[arg(long, global = true, env = "CLAIMER_USER")]
    pub user: Option<String>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands for claimer.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Claim an unclaimed environment.
    ///
    /// Any words after the environment become the claim message, shown by
    /// `owner`.
    Claim(ClaimArgs),

    /// Release a claimed environment.
    Release(TargetArgs),

    /// Show the user who claimed the environment.
    Owner(TargetArgs),

    /// Show claimed and unclaimed environments.
    Status(StatusArgs),

    /// Create a new environment (`pool`, or `pool/lock` to add a lock).
    Create(TargetArgs),

    /// Destroy an environment (`pool`, or `pool/lock` for one lock).
    Destroy(TargetArgs),

    /// List claimed environments grouped by owner.
    Notify,

    /// Read chat commands from stdin, one per line, and answer on stdout.
    Listen,
}

/// Arguments for `claimer claim`.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct ClaimArgs {
    /// Pool name, or `pool/lock`.
    pub env: String,

    /// Optional free-text reason for the claim.
    #[arg(trailing_var_arg = true)]
    pub message: Vec<String>,
}

/// A single environment argument.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct TargetArgs {
    /// Pool name, or `pool/lock`.
    pub env: String,
}

/// Arguments for `claimer status`.
#[derive(Args, Debug, PartialEq, Eq)]
pub struct StatusArgs {
    /// Print the full snapshot as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
