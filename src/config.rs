//! Configuration
//!
//! Priority (highest first):
//! 1. Command-line flags (applied by the binary)
//! 2. `LITEPOST_API_URL` / `NEXT_PUBLIC_API_URL`, `LITEPOST_TIMEOUT_SECS`
//! 3. `config.toml` in the user config directory
//! 4. Built-in defaults

use crate::api::{DEFAULT_TIMEOUT_SECS, normalize_base_url};
use crate::error::{Error, Result};
use crate::upload::{FailurePolicy, SimulatorConfig};
use crate::validation::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default backend used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Posts backend
    pub api: ApiConfig,
    /// Upload simulation
    pub upload: UploadConfig,
    /// Form behaviour
    pub form: FormConfig,
    /// Related posts cache
    pub related: RelatedConfig,
}

/// Posts backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; `/api` is appended when missing
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Failure behaviour of the upload simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FailureConfig {
    /// Never fail
    Never,
    /// Always fail at `percent`
    At {
        /// Progress value at which the upload fails
        percent: u8,
    },
    /// Fail at `percent` with `probability`
    Chance {
        /// Progress value at which the roll happens
        percent: u8,
        /// Probability of failing (0.0-1.0)
        probability: f64,
    },
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self::Chance {
            percent: 60,
            probability: 0.2,
        }
    }
}

impl From<FailureConfig> for FailurePolicy {
    fn from(value: FailureConfig) -> Self {
        match value {
            FailureConfig::Never => Self::Never,
            FailureConfig::At { percent } => Self::At(percent),
            FailureConfig::Chance {
                percent,
                probability,
            } => Self::Chance {
                at: percent,
                probability,
            },
        }
    }
}

/// Upload simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Progress added per tick
    pub step: u8,
    /// Milliseconds between ticks
    pub interval_ms: u64,
    /// Milliseconds of local processing at 100%
    pub processing_ms: u64,
    /// Milliseconds the completed state is held
    pub hold_ms: u64,
    /// Failure injection
    pub failure: FailureConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            step: 10,
            interval_ms: 200,
            processing_ms: 500,
            hold_ms: 1000,
            failure: FailureConfig::default(),
        }
    }
}

/// Form settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Validate the title on every change instead of on blur only
    pub validate_on_change: bool,
    /// Delay between closing the dialog and resetting its state
    pub close_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validate_on_change: false,
            close_delay_ms: 300,
        }
    }
}

/// Related posts cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedConfig {
    /// Seconds a fetched list stays fresh
    pub stale_secs: u64,
    /// Milliseconds before the single retry of a failed fetch
    pub retry_delay_ms: u64,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            stale_secs: 300,
            retry_delay_ms: 500,
        }
    }
}

impl Config {
    /// Default location: `<config dir>/litepost/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("litepost").join("config.toml"))
    }

    /// Load from `path` (or the default location), then apply the environment.
    ///
    /// An explicitly given path must exist; a missing default file means
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::from_file(&p)?,
                _ => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config file");
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Ok(toml::from_str(&text)?)
    }

    /// Apply overrides from environment variables looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("LITEPOST_API_URL").or_else(|| lookup("NEXT_PUBLIC_API_URL")) {
            debug!(%url, "API URL from environment");
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("LITEPOST_TIMEOUT_SECS") {
            self.api.timeout_secs = secs.trim().parse().map_err(|_| {
                Error::Config(format!("LITEPOST_TIMEOUT_SECS must be a number, got {secs:?}"))
            })?;
        }
        Ok(())
    }

    /// Check values that would make the dialog misbehave
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| Error::Config(format!("invalid API URL {:?}: {e}", self.api.base_url)))?;
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be positive".to_string()));
        }
        if self.upload.step == 0 || self.upload.step > 100 {
            return Err(Error::Config(format!(
                "upload.step must be between 1 and 100, got {}",
                self.upload.step
            )));
        }
        if self.upload.interval_ms == 0 {
            return Err(Error::Config("upload.interval_ms must be positive".to_string()));
        }
        if let FailureConfig::Chance { probability, .. } = self.upload.failure {
            if !(0.0..=1.0).contains(&probability) {
                return Err(Error::Config(format!(
                    "upload.failure.probability must be between 0 and 1, got {probability}"
                )));
            }
        }
        Ok(())
    }

    /// Replace the API URL (command-line override) and re-check it
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        url.clone_into(&mut self.api.base_url);
        self.validate()?;
        Ok(self)
    }

    /// Base URL ending in `/api`
    pub fn api_base_url(&self) -> String {
        normalize_base_url(&self.api.base_url)
    }

    /// HTTP request timeout
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Simulator timing derived from the upload section
    pub fn simulator(&self) -> SimulatorConfig {
        SimulatorConfig {
            step: self.upload.step,
            interval: Duration::from_millis(self.upload.interval_ms),
            processing: Duration::from_millis(self.upload.processing_ms),
            hold: Duration::from_millis(self.upload.hold_ms),
            failure: self.upload.failure.into(),
        }
    }

    /// Title validation policy
    pub const fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            on_blur: true,
            on_change: self.form.validate_on_change,
        }
    }

    /// Delay before a closed dialog is reset
    pub const fn close_delay(&self) -> Duration {
        Duration::from_millis(self.form.close_delay_ms)
    }

    /// Freshness window of the related posts cache
    pub const fn related_stale_after(&self) -> Duration {
        Duration::from_secs(self.related.stale_secs)
    }

    /// Delay before retrying a failed related posts fetch
    pub const fn related_retry_delay(&self) -> Duration {
        Duration::from_millis(self.related.retry_delay_ms)
    }
}
