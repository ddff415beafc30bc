//! Configuration structures for the IPO watch system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `feed.url`.
pub const ENV_FEED_URL: &str = "IPO_FEED_URL";
/// Environment variable overriding `feed.live`.
pub const ENV_FEED_LIVE: &str = "IPO_FEED_LIVE";
/// Environment variable overriding `feed.seed_path`.
pub const ENV_SEED_PATH: &str = "IPO_SEED_PATH";
/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "IPO_LOG_LEVEL";

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed (fetcher) configuration.
    pub feed: FeedConfig,
    /// Lifecycle classification configuration.
    pub classification: ClassificationConfig,
    /// Table rendering configuration.
    pub display: DisplayConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed.url = url;
        }
        if let Some(live) = lookup(ENV_FEED_LIVE) {
            self.feed.live = parse_flag(&live)
                .ok_or_else(|| Error::config(format!("{} must be a boolean, got '{}'", ENV_FEED_LIVE, live)))?;
        }
        if let Some(path) = lookup(ENV_SEED_PATH) {
            self.feed.seed_path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.feed.live && self.feed.url.trim().is_empty() {
            return Err(Error::config("feed.url must be set when feed.live is true"));
        }
        if !self.feed.live && self.feed.seed_path.is_none() {
            return Err(Error::config("feed.seed_path must be set when feed.live is false"));
        }
        if self.feed.retry_attempts == 0 {
            return Err(Error::config("feed.retry_attempts must be at least 1"));
        }
        if self.feed.timeout_ms == 0 {
            return Err(Error::config("feed.timeout_ms must be greater than 0"));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Endpoint returning the IPO list.
    pub url: String,
    /// Request timeout (ms).
    pub timeout_ms: u64,
    /// Total attempts per load, including the first.
    pub retry_attempts: u32,
    /// Delay before the first retry (ms); doubles on each retry.
    pub retry_initial_delay_ms: u64,
    /// Fetch from `url`; when false only the seed dataset is used.
    pub live: bool,
    /// Seed dataset used as a fallback when the live feed fails.
    pub seed_path: Option<PathBuf>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000/api/ipos".to_string(),
            timeout_ms: 10_000,
            retry_attempts: 3,
            retry_initial_delay_ms: 250,
            live: true,
            seed_path: None,
        }
    }
}

/// Which rule decides the lifecycle bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    /// Open/close window only.
    #[default]
    DateRange,
    /// Open/close window, plus a past listing date forces Closed.
    ListingAware,
}

/// Classification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub rule: ClassificationRule,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Text shown for missing or non-finite values.
    pub placeholder: String,
    /// Prefix for currency amounts.
    pub currency_symbol: String,
    /// Colour GMP cells in text output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            placeholder: "N/A".to_string(),
            currency_symbol: "₹".to_string(),
            color: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or filter directive (e.g. "info", "ipo_feed=debug").
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
