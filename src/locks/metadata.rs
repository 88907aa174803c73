//! Who holds the working-directory lock, and whether they still can.

use crate::error::{ClaimerError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of `<working_dir>.lock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    pub user: String,
    pub host: String,
    pub pid: u32,
    pub created_at: DateTime<Utc>,
    /// Lock-manager operation in progress (claim, status, ...).
    pub action: String,
}

impl LockMetadata {
    /// Metadata for this process running `action`, stamped now.
    pub fn for_current_process(action: &str) -> Self {
        Self {
            user: current_user(),
            host: current_host(),
            pid: std::process::id(),
            created_at: Utc::now(),
            action: action.to_string(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ClaimerError::Io(format!("failed to read lock '{}': {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ClaimerError::Io(format!("failed to parse lock '{}': {}", path.display(), e))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClaimerError::Io(format!("failed to serialize lock metadata: {}", e)))
    }

    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// `5m`, `2h 5m` or `2d 2h`.
    pub fn age_string(&self) -> String {
        format_age(self.age())
    }

    /// Why this holder can no longer be holding the lock, if it can't.
    ///
    /// A holder on this host whose process has exited is gone. Any holder
    /// older than `stale_minutes` is presumed hung (0 never expires).
    pub fn staleness(&self, stale_minutes: u32) -> Option<String> {
        if self.host == current_host() && !is_process_alive(self.pid) {
            return Some(format!("process {} has exited", self.pid));
        }
        if stale_minutes > 0 && self.age().num_minutes() >= i64::from(stale_minutes) {
            return Some(format!(
                "held for {}, limit is {}m",
                self.age_string(),
                stale_minutes
            ));
        }
        None
    }

    /// `user@host (pid N) for 3m, action: claim`
    pub fn describe(&self) -> String {
        format!(
            "{}@{} (pid {}) for {}, action: {}",
            self.user,
            self.host,
            self.pid,
            self.age_string(),
            self.action
        )
    }
}

fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes().max(0);
    let (days, hours) = (minutes / (24 * 60), minutes / 60);

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn current_host() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}/stat", pid)).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(true)
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
