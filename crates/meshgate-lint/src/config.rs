//! Validator configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options that shape a validation run.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Record fix candidates and apply the auto-fixable ones (default: false).
    pub fix: bool,
    /// Pass ids to skip.
    pub disabled_passes: Vec<String>,
    /// When set, run only these pass ids.
    pub only_passes: Option<Vec<String>>,
    /// Require a VEC2 `TEXCOORD_0` on every primitive (default: true).
    pub require_texcoord0: bool,
    /// Run passes and payload lookups on the rayon pool (default: true).
    pub parallel: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fix: false,
            disabled_passes: Vec::new(),
            only_passes: None,
            require_texcoord0: true,
            parallel: true,
        }
    }
}

/// Errors that can occur while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ValidatorConfig {
    /// Parse a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Returns a copy with fix mode set.
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }
}
