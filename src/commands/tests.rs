//! Command replies, end to end against a bare remote.

use super::*;
use crate::locker::ManagerOptions;
use crate::store::GitRepo;
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

fn reply(dispatcher: &Dispatcher<GitRepo>, text: &str, user: &str) -> String {
    dispatcher.execute(&ChatCommand::parse(text), user).unwrap()
}

#[test]
fn chat_session_lifecycle() {
    let remote = TestRemote::new();
    let bot = dispatcher(&remote);

    assert_eq!(reply(&bot, "@claimer create p1", "alice"), "Created p1");
    assert_eq!(reply(&bot, "@claimer create p1", "bob"), "p1 already exists");
    assert_eq!(reply(&bot, "@claimer claim p1", "alice"), "Claimed p1");
    assert_eq!(reply(&bot, "@claimer claim p1", "bob"), "p1 is already claimed");
    assert_eq!(reply(&bot, "@claimer release p1", "alice"), "Released p1");
    assert_eq!(reply(&bot, "@claimer release p1", "alice"), "p1 is not claimed");
    assert_eq!(reply(&bot, "@claimer destroy p1", "alice"), "Destroyed p1");
    assert_eq!(reply(&bot, "@claimer destroy p1", "alice"), "p1 does not exist");
    assert_eq!(reply(&bot, "@claimer claim p1", "alice"), "p1 does not exist");
    assert_eq!(reply(&bot, "@claimer release p1", "alice"), "p1 does not exist");
}

#[test]
fn create_over_non_pool_directory_is_answered() {
    let remote = TestRemote::new();
    remote.push_foreign_change(|clone| {
        std::fs::create_dir_all(clone.join("docs")).unwrap();
        std::fs::write(clone.join("docs/README.md"), "notes").unwrap();
    });
    let bot = dispatcher(&remote);

    assert_eq!(
        reply(&bot, "create docs/env-1", "alice"),
        "docs already exists in the repository but is not a pool"
    );
    assert_eq!(reply(&bot, "claim docs", "alice"), "docs does not exist");
}

#[test]
fn missing_arguments_are_answered() {
    let remote = TestRemote::new();
    let bot = dispatcher(&remote);

    assert_eq!(reply(&bot, "claim", "alice"), "must specify lock to claim");
    assert_eq!(reply(&bot, "release", "alice"), "must specify pool to release");
    assert_eq!(reply(&bot, "owner", "alice"), "must specify pool");
    assert_eq!(
        reply(&bot, "create", "alice"),
        "must specify name of pool to create"
    );
    assert_eq!(reply(&bot, "destroy", "alice"), "must specify pool to destroy");
}

#[test]
fn invalid_names_are_answered() {
    let remote = TestRemote::new();
    let bot = dispatcher(&remote);

    assert_eq!(reply(&bot, "claim ../etc", "alice"), "../etc is not a valid name");
    assert_eq!(reply(&bot, "create .hidden", "alice"), ".hidden is not a valid name");
    assert_eq!(remote.commit_count(), 1);
}

#[test]
fn owner_reply_includes_claim_message() {
    let remote = TestRemote::new();
    let bot = dispatcher(&remote);
    reply(&bot, "create p1", "alice");

    assert_eq!(reply(&bot, "owner p1", "bob"), "p1 is not claimed");
    assert_eq!(reply(&bot, "owner p9", "bob"), "p9 does not exist");

    reply(&bot, "claim p1 \"testing the deploy\"", "alice");
    let owner = reply(&bot, "owner p1", "bob");
    assert!(owner.starts_with("p1 was claimed by alice on "), "{}", owner);
    assert!(owner.ends_with(" (testing the deploy)"), "{}", owner);

    reply(&bot, "release p1", "alice");
    reply(&bot, "claim p1", "carol");
    let owner = reply(&bot, "owner p1", "bob");
    assert!(owner.starts_with("p1 was claimed by carol on "), "{}", owner);
    assert!(!owner.ends_with(')'), "{}", owner);
}

#[test]
fn status_splits_by_holder() {
    let remote = TestRemote::with_pools(&[
        PoolFixture {
            name: "qa",
            claimed: &[],
            unclaimed: &["env-1", "env-2", "env-3"],
        },
        PoolFixture {
            name: "p1",
            claimed: &[],
            unclaimed: &["p1"],
        },
    ]);
    let bot = dispatcher(&remote);
    reply(&bot, "claim qa/env-2", "alice");
    reply(&bot, "claim p1", "bob");

    assert_eq!(
        reply(&bot, "status", "alice"),
        "*Claimed by you:* qa/env-2\n*Claimed by others:* p1\n*Unclaimed:* qa/env-1, qa/env-3"
    );
}

#[test]
fn bare_claim_reports_chosen_lock() {
    let remote = TestRemote::with_pools(&[PoolFixture {
        name: "qa",
        claimed: &[],
        unclaimed: &["env-1", "env-2"],
    }]);
    let bot = dispatcher(&remote);

    assert_eq!(reply(&bot, "claim qa", "alice"), "Claimed qa/env-1");
    assert_eq!(reply(&bot, "claim qa", "bob"), "Claimed qa/env-2");
    assert_eq!(reply(&bot, "claim qa", "carol"), "qa is already claimed");
    assert_eq!(
        reply(&bot, "release qa", "alice"),
        "qa has more than one lock, specify one as qa/<lock>"
    );
}

#[test]
fn notify_groups_by_owner() {
    let remote = TestRemote::with_pools(&[PoolFixture {
        name: "qa",
        claimed: &[],
        unclaimed: &["env-1", "env-2", "env-3"],
    }]);
    let bot = dispatcher(&remote);

    assert_eq!(reply(&bot, "notify", "alice"), "No locks currently claimed.");

    reply(&bot, "claim qa/env-3", "bob");
    reply(&bot, "claim qa/env-1", "alice");
    reply(&bot, "claim qa/env-2", "bob");

    assert_eq!(
        reply(&bot, "notify", "alice"),
        "Currently claimed locks, please release if not in use:\n\
         @alice: qa/env-1\n\
         @bob: qa/env-2, qa/env-3"
    );
}

#[test]
fn help_and_unknown() {
    let remote = TestRemote::new();
    let bot = dispatcher(&remote);

    let help = reply(&bot, "@claimer help", "alice");
    assert!(help.starts_with("Available commands:\n```\n"));
    assert!(help.contains("claim <env> [<message>]"));

    assert_eq!(
        reply(&bot, "@claimer dance", "alice"),
        "Unknown command. Try `@claimer help` to see usage."
    );
}

#[test]
fn custom_messages_are_used() {
    let remote = TestRemote::new();
    let messages = Messages::from_yaml("create:\n  success: \"Made {pool}!\"\n").unwrap();
    let bot = Dispatcher::new(
        LockManager::new(
            GitRepo::new(&remote.url, remote.work_dir("locks")),
            ManagerOptions::default(),
        ),
        messages,
    );

    assert_eq!(reply(&bot, "create p1", "alice"), "Made p1!");
}

#[test]
fn infrastructure_errors_propagate() {
    let remote = TestRemote::new();
    let bot = Dispatcher::new(
        LockManager::new(
            GitRepo::new(
                remote.work_dir("missing.git").to_string_lossy(),
                remote.work_dir("locks"),
            ),
            ManagerOptions::default(),
        ),
        Messages::default(),
    );

    let err = bot.execute(&ChatCommand::parse("status"), "alice").unwrap_err();
    assert!(matches!(err, ClaimerError::Sync(_)));

    // Commands that never reach the store still answer.
    assert_eq!(reply(&bot, "claim", "alice"), "must specify lock to claim");
}
