use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A plain repository with one commit on `main`.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    init_repo(temp_dir.path());
    std::fs::write(temp_dir.path().join("README.md"), "# Test\n").unwrap();
    git(temp_dir.path(), &["add", "."]);
    git(temp_dir.path(), &["commit", "-m", "Initial commit"]);
    temp_dir
}

/// Layout of one pool seeded into a [`TestRemote`].
pub(crate) struct PoolFixture<'a> {
    pub name: &'a str,
    pub claimed: &'a [&'a str],
    pub unclaimed: &'a [&'a str],
}

/// A bare repository standing in for the shared remote.
///
/// Working copies for the code under test should be placed with
/// [`TestRemote::work_dir`] so they are cleaned up with the fixture.
pub(crate) struct TestRemote {
    dir: TempDir,
    pub(crate) url: String,
}

impl TestRemote {
    pub(crate) fn new() -> Self {
        Self::with_pools(&[])
    }

    pub(crate) fn with_pools(pools: &[PoolFixture<'_>]) -> Self {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed");
        std::fs::create_dir_all(&seed).unwrap();
        init_repo(&seed);

        std::fs::write(seed.join("README.md"), "# Locks\n").unwrap();
        for pool in pools {
            let pool_dir = seed.join(pool.name);
            for (bucket, locks) in [("claimed", pool.claimed), ("unclaimed", pool.unclaimed)] {
                let bucket_dir = pool_dir.join(bucket);
                std::fs::create_dir_all(&bucket_dir).unwrap();
                std::fs::write(bucket_dir.join(".gitkeep"), "").unwrap();
                for lock in locks {
                    std::fs::write(bucket_dir.join(lock), "").unwrap();
                }
            }
        }
        git(&seed, &["add", "-A"]);
        git(&seed, &["commit", "-m", "Initial commit"]);

        let remote = dir.path().join("remote.git");
        git(
            dir.path(),
            &["clone", "--bare", "seed", remote.to_str().unwrap()],
        );

        Self {
            url: remote.to_string_lossy().to_string(),
            dir,
        }
    }

    /// A not-yet-existing directory inside the fixture for a working copy.
    pub(crate) fn work_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join("work").join(name)
    }

    pub(crate) fn has_file(&self, path: &str) -> bool {
        Command::new("git")
            .args(["--git-dir", &self.url, "cat-file", "-e"])
            .arg(format!("main:{}", path))
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub(crate) fn head(&self, format: &str) -> String {
        git_bare(&self.url, &["log", "-1", &format!("--format={}", format), "main"])
    }

    pub(crate) fn commit_count(&self) -> usize {
        git_bare(&self.url, &["rev-list", "--count", "main"])
            .parse()
            .unwrap()
    }

    /// Commit and push a change from an unrelated clone, as another process would.
    pub(crate) fn push_foreign_change(&self, change: impl FnOnce(&Path)) {
        let other = TempDir::new().unwrap();
        let clone = other.path().join("clone");
        git(
            other.path(),
            &["clone", &self.url, clone.to_str().unwrap()],
        );
        git(&clone, &["config", "user.email", "other@example.com"]);
        git(&clone, &["config", "user.name", "Other Process"]);
        change(&clone);
        git(&clone, &["add", "-A"]);
        git(&clone, &["commit", "-m", "Foreign change"]);
        git(&clone, &["push", "origin", "HEAD:main"]);
    }
}

fn init_repo(path: &Path) {
    git(path, &["init"]);
    // Deterministic default branch across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
}

fn git_bare(git_dir: &str, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["--git-dir", git_dir])
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// PID of a process that has already exited and been reaped.
pub(crate) fn exited_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

/// Leak a working-directory lock as a killed process would, then rewrite
/// what its file says about the holder.
pub(crate) fn abandon_workdir_lock(
    working_dir: &Path,
    action: &str,
    edit: impl FnOnce(&mut crate::locks::LockMetadata),
) {
    let held = crate::locks::acquire_workdir_lock(working_dir, action, 0).unwrap();
    std::mem::forget(held);

    let path = crate::locks::workdir_lock_path(working_dir).unwrap();
    let mut holder = crate::locks::LockMetadata::read(&path).unwrap();
    edit(&mut holder);
    std::fs::write(&path, holder.to_json().unwrap()).unwrap();
}
