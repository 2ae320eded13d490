//! Configuration for deprecation checks
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then the
//! `CDN_DEPRECATION_REFERENCE_TZ` environment variable.
//!
//! ```json
//! {
//!   "reference_timezone": "America/Los_Angeles",
//!   "thresholds": { "cdn_classic_creation": "2025-10-01" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checks::{DeprecationCheck, DeprecationRegistry, ThresholdTable};
use crate::clock::{Clock, SystemClock};
use crate::evaluator::Evaluator;
use crate::timezone::{self, DEFAULT_REFERENCE_TIMEZONE};

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A threshold override names a check that does not exist
    #[error("Unknown deprecation check in thresholds: {0}")]
    UnknownCheck(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeprecationConfig {
    /// IANA name of the timezone thresholds are published in
    pub reference_timezone: String,
    /// Per-check threshold overrides, keyed by check name
    pub thresholds: BTreeMap<String, String>,
}

impl Default for DeprecationConfig {
    fn default() -> Self {
        Self {
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.to_string(),
            thresholds: BTreeMap::new(),
        }
    }
}

impl DeprecationConfig {
    /// Environment variable overriding the reference timezone
    pub const ENV_REFERENCE_TIMEZONE: &'static str = "CDN_DEPRECATION_REFERENCE_TZ";

    /// Read configuration from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        Ok(config.with_env_override(std::env::var(Self::ENV_REFERENCE_TIMEZONE).ok()))
    }

    /// Apply the value of the reference timezone variable, if set and non-empty
    pub fn with_env_override(mut self, reference_timezone: Option<String>) -> Self {
        if let Some(tz) = reference_timezone.filter(|tz| !tz.trim().is_empty()) {
            log::debug!("Reference timezone overridden from environment: {}", tz);
            self.reference_timezone = tz;
        }
        self
    }

    /// The reference timezone, UTC if the name is unknown
    pub fn reference_zone(&self) -> Tz {
        timezone::resolve(&self.reference_timezone)
    }

    /// Defaults with this configuration's overrides applied.
    ///
    /// Override dates are not validated here; see [`ThresholdTable::validate`].
    pub fn threshold_table(&self) -> ConfigResult<ThresholdTable> {
        let mut table = ThresholdTable::default();
        for (name, date) in &self.thresholds {
            let check: DeprecationCheck = name
                .parse()
                .map_err(|_| ConfigError::UnknownCheck(name.clone()))?;
            table.set(check, date.clone());
        }
        Ok(table)
    }

    pub fn registry(&self) -> ConfigResult<DeprecationRegistry<SystemClock>> {
        self.registry_with_clock(SystemClock)
    }

    pub fn registry_with_clock<C: Clock>(&self, clock: C) -> ConfigResult<DeprecationRegistry<C>> {
        Ok(DeprecationRegistry::with_clock(
            Evaluator::new(self.reference_zone()),
            self.threshold_table()?,
            clock,
        ))
    }
}
