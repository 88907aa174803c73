//! Config loading and validation.

use super::model::Config;
use crate::error::{ClaimerError, Result};
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    /// The result is not validated; call [`Config::validate`] once command-line
    /// overrides have been applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ClaimerError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
            .map_err(|e| ClaimerError::UserError(format!("failed to parse config YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("repo_url", self.repo_url.trim().is_empty()),
            ("working_dir", self.working_dir.as_os_str().is_empty()),
            ("remote", self.remote.trim().is_empty()),
            ("branch", self.branch.trim().is_empty()),
            ("committer_name", self.committer_name.trim().is_empty()),
        ];

        for (field, missing) in required {
            if missing {
                return Err(ClaimerError::UserError(format!(
                    "config validation failed: {} must be set",
                    field
                )));
            }
        }

        if let Some(key) = &self.deploy_key_path
            && !key.is_file()
        {
            return Err(ClaimerError::UserError(format!(
                "config validation failed: deploy_key_path '{}' is not a file",
                key.display()
            )));
        }

        Ok(())
    }
}
