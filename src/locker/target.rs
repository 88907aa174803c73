//! Parsing and validation of lock addresses (`pool` or `pool/lock`).

use crate::error::{ClaimerError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A single pool or lock name segment.
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("Invalid lock name regex")
});

/// What a command addresses: a whole pool, or one lock inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockTarget {
    pool: String,
    lock: Option<String>,
}

impl LockTarget {
    /// Parse `pool` or `pool/lock`.
    ///
    /// Each segment must start with an alphanumeric character and contain only
    /// alphanumerics, `.`, `_` or `-`. That rules out hidden names, `..` and
    /// nested paths, so a target can never escape its pool directory.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (pool, lock) = match text.split_once('/') {
            Some((pool, lock)) => (pool, Some(lock)),
            None => (text, None),
        };

        validate_segment("pool", pool, text)?;
        if let Some(lock) = lock {
            validate_segment("lock", lock, text)?;
        }

        Ok(Self {
            pool: pool.to_string(),
            lock: lock.map(str::to_string),
        })
    }

    /// Parse a name that must denote a whole pool.
    pub fn parse_pool(text: &str) -> Result<Self> {
        let target = Self::parse(text)?;
        if target.lock.is_some() {
            return Err(ClaimerError::UserError(format!(
                "invalid pool name '{}': pool names cannot contain '/'",
                text.trim()
            )));
        }
        Ok(target)
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn lock(&self) -> Option<&str> {
        self.lock.as_deref()
    }
}

impl fmt::Display for LockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lock {
            Some(lock) => write!(f, "{}/{}", self.pool, lock),
            None => f.write_str(&self.pool),
        }
    }
}

fn validate_segment(kind: &str, segment: &str, text: &str) -> Result<()> {
    if NAME_REGEX.is_match(segment) {
        return Ok(());
    }
    let reason = if segment.is_empty() {
        format!("{} name is empty", kind)
    } else if segment.contains('/') {
        "nested paths are not allowed".to_string()
    } else {
        format!(
            "{} names must start with a letter or digit and contain only letters, digits, '.', '_' or '-'",
            kind
        )
    };
    Err(ClaimerError::UserError(format!(
        "invalid name '{}': {}",
        text, reason
    )))
}

/// Name shown to users for `lock` in `pool`.
///
/// A pool holding a single lock file is addressed by the pool name alone.
pub fn display_name(pool: &str, lock: &str, locks_in_pool: usize) -> String {
    if locks_in_pool == 1 {
        pool.to_string()
    } else {
        format!("{}/{}", pool, lock)
    }
}
