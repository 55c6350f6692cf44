//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every field has a default, so
//! an empty file (or no file) is valid.
//!
//! ```yaml
//! default_duration_secs: 604800
//! agreement_path: agreements/crid.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default enrollment window for `crid deploy`: seven days.
pub const DEFAULT_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Default agreement file when neither `--agreement` nor config names one.
pub const DEFAULT_AGREEMENT_PATH: &str = "agreement.json";

/// Environment variable holding a hex-encoded private key seed.
pub const PRIVATE_KEY_ENV: &str = "CRID_PRIVATE_KEY";

/// Settings loaded from the `--config` file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Enrollment window used by `deploy` when `--duration` is omitted.
    pub default_duration_secs: u64,
    /// Agreement file used when `--agreement` / `--out` is omitted.
    pub agreement_path: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: DEFAULT_DURATION_SECS,
            agreement_path: PathBuf::from(DEFAULT_AGREEMENT_PATH),
        }
    }
}

impl CliConfig {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Parse YAML text. Blank input yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
