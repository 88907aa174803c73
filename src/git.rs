//! Git command runner for claimer.
//!
//! Provides a wrapper around git subprocesses with captured stdout/stderr
//! and structured error handling. All git operations go through this module.

use crate::error::{ClaimerError, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command in `cwd` with extra environment variables set on the
/// subprocess.
///
/// Returns `ClaimerError::Git` on a non-zero exit, carrying stderr (or stdout
/// when stderr is empty, which is where `git commit` reports "nothing to
/// commit").
pub fn run_git_with_env<P: AsRef<Path>>(
    cwd: P,
    args: &[&str],
    env: &[(String, String)],
) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    debug!(cwd = %cwd.display(), args = ?args, "running git");

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .output()
        .map_err(|e| {
            ClaimerError::Git(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(ClaimerError::Git(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_repo;
    use tempfile::TempDir;

    #[test]
    fn run_git_captures_stdout() {
        let temp_dir = create_test_repo();
        let output = run_git_with_env(temp_dir.path(), &["rev-parse", "--is-inside-work-tree"], &[]).unwrap();
        assert_eq!(output.stdout, "true");
    }

    #[test]
    fn run_git_failure_returns_git_error() {
        let temp_dir = create_test_repo();
        let err = run_git_with_env(temp_dir.path(), &["checkout", "nonexistent-branch"], &[]).unwrap_err();
        assert!(matches!(err, ClaimerError::Git(_)));
        assert!(err.detail().starts_with("git checkout failed"));
    }

    #[test]
    fn run_git_outside_repo_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = run_git_with_env(temp_dir.path(), &["rev-parse", "--is-inside-work-tree"], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn run_git_with_env_passes_variables() {
        let temp_dir = create_test_repo();
        let env = vec![("GIT_AUTHOR_NAME".to_string(), "Env Author".to_string())];
        let output = run_git_with_env(temp_dir.path(), &["var", "GIT_AUTHOR_IDENT"], &env).unwrap();
        assert!(output.stdout.starts_with("Env Author"));
    }

    #[test]
    fn git_output_is_empty() {
        let empty = GitOutput {
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(empty.is_empty());
    }
}
