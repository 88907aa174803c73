//! `VersionedStore` backed by the `git` command line.

use super::{CommitInfo, VersionedStore};
use crate::config::Config;
use crate::error::{ClaimerError, Result};
use crate::git::{GitOutput, run_git_with_env};
use chrono::DateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Field separator for `git log --format`; never appears in names or dates.
const FIELD_SEPARATOR: char = '\u{1f}';

/// A working copy of the shared lock repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    url: String,
    dir: PathBuf,
    remote: String,
    branch: String,
    deploy_key: Option<PathBuf>,
    committer_name: String,
    committer_email: String,
}

impl GitRepo {
    /// A store for `url` kept at `dir`, with default remote/branch/committer.
    pub fn new(url: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self::from_config(&Config {
            repo_url: url.into(),
            working_dir: dir.into(),
            ..Config::default()
        })
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.repo_url.clone(),
            dir: config.working_dir.clone(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            deploy_key: config.deploy_key_path.clone(),
            committer_name: config.committer_name.clone(),
            committer_email: config.committer_email.clone(),
        }
    }

    /// Environment for every git subprocess.
    fn env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            // Never block on an interactive credential prompt.
            ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
            ("GIT_COMMITTER_NAME".to_string(), self.committer_name.clone()),
            ("GIT_COMMITTER_EMAIL".to_string(), self.committer_email.clone()),
        ];
        if let Some(key) = &self.deploy_key {
            let key = key.to_string_lossy();
            env.push((
                "GIT_SSH_COMMAND".to_string(),
                format!(
                    "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=no",
                    shell_words::quote(&key)
                ),
            ));
        }
        env
    }

    fn git(&self, args: &[&str]) -> Result<GitOutput> {
        run_git_with_env(&self.dir, args, &self.env())
    }

    fn is_cloned(&self) -> bool {
        self.dir.join(".git").exists()
    }

    fn clone_repo(&self) -> Result<()> {
        if let Some(parent) = self.dir.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClaimerError::Sync(format!(
                    "failed to create '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let dir = self.dir.to_string_lossy();
        run_git_with_env(
            ".",
            &[
                "clone",
                "--origin",
                &self.remote,
                "--branch",
                &self.branch,
                &self.url,
                &dir,
            ],
            &self.env(),
        )
        .map_err(|e| ClaimerError::Sync(format!("failed to clone repo: {}", e.detail())))?;

        info!(url = %self.url, dir = %self.dir.display(), "cloned lock repository");
        Ok(())
    }

    fn reset_to_remote(&self) -> Result<()> {
        self.git(&["fetch", &self.remote])
            .map_err(|e| ClaimerError::Sync(format!("failed to fetch repo: {}", e.detail())))?;

        let tip = format!("{}/{}", self.remote, self.branch);
        self.git(&["reset", "--hard", &tip])
            .map_err(|e| ClaimerError::Sync(format!("failed to reset repo: {}", e.detail())))?;

        // Untracked leftovers from a failed operation survive a hard reset.
        self.git(&["clean", "-fdx"])
            .map_err(|e| ClaimerError::Sync(format!("failed to clean repo: {}", e.detail())))?;

        debug!(tip = %tip, "working copy reset to remote");
        Ok(())
    }
}

impl VersionedStore for GitRepo {
    fn synchronize(&self) -> Result<()> {
        if self.is_cloned() {
            self.reset_to_remote()
        } else {
            self.clone_repo()
        }
    }

    fn commit_and_push(&self, message: &str, author: &str) -> Result<()> {
        self.git(&["add", "-A"])
            .map_err(|e| ClaimerError::Commit(format!("failed to stage files: {}", e.detail())))?;

        let author_ident = format!("{} <>", author);
        self.git(&["commit", "--author", &author_ident, "-m", message])
            .map_err(|e| ClaimerError::Commit(format!("failed to commit: {}", e.detail())))?;

        let refspec = format!("HEAD:{}", self.branch);
        self.git(&["push", &self.remote, &refspec]).map_err(|e| {
            let detail = e.detail();
            if is_rejected_push(detail) {
                ClaimerError::Push(format!(
                    "push rejected, remote has advanced: {}",
                    detail
                ))
            } else {
                ClaimerError::Push(format!("failed to push: {}", detail))
            }
        })?;

        Ok(())
    }

    fn working_directory(&self) -> &Path {
        &self.dir
    }

    fn latest_commit(&self, path: &Path) -> Result<CommitInfo> {
        let path_arg = path.to_string_lossy();
        let output = self
            .git(&["log", "-1", "--format=%an%x1f%aI%x1f%b", "--", &path_arg])
            .map_err(|e| {
                ClaimerError::History(format!("failed to read history: {}", e.detail()))
            })?;

        if output.is_empty() {
            return Err(ClaimerError::History(format!(
                "no commit history for '{}'",
                path.display()
            )));
        }

        parse_commit_line(&output.stdout)
    }
}

fn parse_commit_line(line: &str) -> Result<CommitInfo> {
    let mut fields = line.splitn(3, FIELD_SEPARATOR);
    let (Some(author), Some(date)) = (fields.next(), fields.next()) else {
        return Err(ClaimerError::History(format!(
            "unexpected git log output: {}",
            line
        )));
    };
    let message = fields.next().unwrap_or("");

    let date = DateTime::parse_from_rfc3339(date.trim()).map_err(|e| {
        ClaimerError::History(format!("failed to parse commit date '{}': {}", date, e))
    })?;

    Ok(CommitInfo {
        author: author.trim().to_string(),
        date,
        message: message.trim().to_string(),
    })
}

fn is_rejected_push(detail: &str) -> bool {
    detail.contains("[rejected]")
        || detail.contains("non-fast-forward")
        || detail.contains("fetch first")
}
