//! Claimer: chat-driven environment claiming backed by a shared git
//! repository.
//!
//! This is the main entry point for the `claimer` CLI. It parses arguments,
//! sets up logging, builds the lock manager from config, runs one command
//! (or the line-based chat loop) and maps errors to exit codes.

mod bot;
mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod locker;
pub mod locks;
pub mod messages;
pub mod store;
#[cfg(test)]
mod test_support;

use bot::{Bot, LineTransport};
use cli::{Cli, Command, GlobalArgs};
use commands::{ChatCommand, Dispatcher, owner_reply};
use config::Config;
use error::{ClaimerError, Result};
use locker::{LockManager, LockTarget, ManagerOptions};
use messages::{Messages, render};
use std::io;
use std::process::ExitCode;
use store::GitRepo;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_logging(cli.global.debug);

    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Log to stderr so replies on stdout stay scriptable.
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimer=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.global)?;
    let user = resolve_user(&cli.global)?;

    let messages = match &config.messages_file {
        Some(path) => Messages::load(path)?,
        None => Messages::default(),
    };
    let manager = LockManager::new(GitRepo::from_config(&config), ManagerOptions::from(&config));
    let dispatcher = Dispatcher::new(manager, messages);
    debug!(user = %user, repo = %config.repo_url, "claimer ready");

    if cli.command == Command::Listen {
        let stdin = io::stdin();
        let transport = LineTransport::new(stdin.lock(), io::stdout(), user);
        return Bot::new(dispatcher, transport, config.reply_on_error).run();
    }

    let reply = run_command(&dispatcher, cli.command, &user)?;
    println!("{}", reply);
    Ok(())
}

/// Config file (if any) with command-line overrides applied, validated.
fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(url) = &args.repo_url {
        config.repo_url = url.clone();
    }
    if let Some(dir) = &args.working_dir {
        config.working_dir = dir.clone();
    }
    if let Some(branch) = &args.branch {
        config.branch = branch.clone();
    }

    config.validate()?;
    Ok(config)
}

fn resolve_user(args: &GlobalArgs) -> Result<String> {
    args.user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
        .ok_or_else(|| {
            ClaimerError::UserError(
                "no acting user: pass --user or set CLAIMER_USER".to_string(),
            )
        })
}

/// Run a one-shot subcommand.
///
/// Unlike chat, a negative outcome ("already claimed", "does not exist") is
/// an error here so the exit code reflects it.
fn run_command(dispatcher: &Dispatcher<GitRepo>, command: Command, user: &str) -> Result<String> {
    let manager = dispatcher.manager();
    let messages = dispatcher.messages();

    match command {
        Command::Claim(args) => {
            let target = LockTarget::parse(&args.env)?;
            let name = manager.claim(&target, user, &args.message.join(" "))?;
            render(&messages.claim.success, &[("pool", &name)])
        }
        Command::Release(args) => {
            let target = LockTarget::parse(&args.env)?;
            let name = manager.release(&target, user)?;
            render(&messages.release.success, &[("pool", &name)])
        }
        Command::Owner(args) => {
            let target = LockTarget::parse(&args.env)?;
            match manager.owner(&target)? {
                Some(ownership) => owner_reply(messages, &args.env, &ownership),
                None => render(&messages.owner.not_claimed, &[("pool", &args.env)]),
            }
        }
        Command::Status(args) if args.json => {
            let snapshot = manager.status()?;
            serde_json::to_string_pretty(&snapshot).map_err(|e| {
                ClaimerError::Io(format!("failed to serialize status: {}", e))
            })
        }
        Command::Status(_) => dispatcher.execute(&ChatCommand::Status, user),
        Command::Create(args) => {
            let target = LockTarget::parse(&args.env)?;
            let name = manager.create_pool(&target, user)?;
            render(&messages.create.success, &[("pool", &name)])
        }
        Command::Destroy(args) => {
            let target = LockTarget::parse(&args.env)?;
            let name = manager.destroy_pool(&target, user)?;
            render(&messages.destroy.success, &[("pool", &name)])
        }
        Command::Notify => dispatcher.execute(&ChatCommand::Notify, user),
        Command::Listen => Err(ClaimerError::UserError(
            "listen cannot run as a one-shot command".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PoolFixture, TestRemote};

    fn dispatcher(remote: &TestRemote) -> Dispatcher<GitRepo> {
        Dispatcher::new(
            LockManager::new(
                GitRepo::new(&remote.url, remote.work_dir("locks")),
                ManagerOptions::default(),
            ),
            Messages::default(),
        )
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["claimer"];
        argv.extend_from_slice(args);
        <Cli as clap::Parser>::try_parse_from(argv).unwrap()
    }

    #[test]
    fn load_config_applies_overrides() {
        let cli = parse(&[
            "--repo-url",
            "git@example.com:locks.git",
            "--working-dir",
            "/tmp/locks",
            "--branch",
            "locks",
            "status",
        ]);
        let config = load_config(&cli.global).unwrap();
        assert_eq!(config.repo_url, "git@example.com:locks.git");
        assert_eq!(config.working_dir, std::path::PathBuf::from("/tmp/locks"));
        assert_eq!(config.branch, "locks");
        assert_eq!(config.remote, "origin");
    }

    #[test]
    fn load_config_requires_repo() {
        let cli = parse(&["--working-dir", "/tmp/locks", "status"]);
        let err = load_config(&cli.global).unwrap_err();
        assert!(err.to_string().contains("repo_url must be set"));
    }

    #[test]
    fn explicit_user_wins() {
        let cli = parse(&["--user", " alice ", "status"]);
        assert_eq!(resolve_user(&cli.global).unwrap(), "alice");
    }

    #[test]
    fn one_shot_commands_print_replies() {
        let remote = TestRemote::new();
        let dispatcher = dispatcher(&remote);

        let run = |args: &[&str]| run_command(&dispatcher, parse(args).command, "alice");

        assert_eq!(run(&["create", "p1"]).unwrap(), "Created p1");
        assert_eq!(run(&["owner", "p1"]).unwrap(), "p1 is not claimed");
        assert_eq!(run(&["claim", "p1", "load", "test"]).unwrap(), "Claimed p1");
        assert!(
            run(&["owner", "p1"])
                .unwrap()
                .ends_with("(load test)")
        );
        assert_eq!(
            run(&["status"]).unwrap(),
            "*Claimed by you:* p1\n*Claimed by others:* \n*Unclaimed:* "
        );
        assert_eq!(run(&["release", "p1"]).unwrap(), "Released p1");
        assert_eq!(run(&["destroy", "p1"]).unwrap(), "Destroyed p1");
    }

    #[test]
    fn one_shot_negative_outcomes_are_errors() {
        let remote = TestRemote::with_pools(&[PoolFixture {
            name: "p1",
            claimed: &["p1"],
            unclaimed: &[],
        }]);
        let dispatcher = dispatcher(&remote);
        let run = |args: &[&str]| run_command(&dispatcher, parse(args).command, "bob");

        let err = run(&["claim", "p1"]).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

        let err = run(&["create", "p1"]).unwrap_err();
        assert!(matches!(err, ClaimerError::AlreadyExists(_)));

        let err = run(&["claim", "../x"]).unwrap_err();
        assert!(matches!(err, ClaimerError::UserError(_)));
    }

    #[test]
    fn status_json_lists_every_lock() {
        let remote = TestRemote::with_pools(&[PoolFixture {
            name: "qa",
            claimed: &["env-1"],
            unclaimed: &["env-2"],
        }]);
        let dispatcher = dispatcher(&remote);

        let json = run_command(&dispatcher, parse(&["status", "--json"]).command, "alice")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let locks = value.as_array().unwrap();
        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0]["name"], "qa/env-1");
        assert_eq!(locks[0]["state"], "claimed");
        assert_eq!(locks[0]["ownership"]["owner"], "Test User");
        assert_eq!(locks[1]["state"], "unclaimed");
        assert!(locks[1].get("ownership").is_none());
    }
}
