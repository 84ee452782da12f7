//! Discovery run settings.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::{
    calendar::DEFAULT_CUTOVER_MONTH,
    parse::html::DEFAULT_DATE_LABEL,
    persist::sqlite::DEFAULT_START_YEAR,
    types::{Month, Year},
};

/// Competition page prefix on the host.
pub const DEFAULT_BASE_URL: &str = "https://cubing.com/competition/";

/// Invalid or unreadable configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the file failed.
    Io(std::io::Error),
    /// The JSON document is malformed.
    Json(serde_json::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config io error: {e}"),
            Self::Json(e) => write!(f, "config json error: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Settings for one discovery session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum probes in flight at once.
    pub concurrency: usize,
    /// Wait after each probe, whatever its outcome.
    pub pacing_delay_ms: u64,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
    /// Prefix joined with each candidate key.
    pub base_url: String,
    /// Month from which next-year listings are expected.
    pub cutover_month: Month,
    /// Earliest year whose competitions count as known.
    pub start_year: Year,
    /// `<dt>` text labelling the date on a competition page.
    pub date_label: String,
    /// Seed for header randomization; `None` seeds from entropy.
    pub header_seed: Option<u64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            pacing_delay_ms: 100,
            request_timeout_ms: 15_000,
            base_url: DEFAULT_BASE_URL.to_string(),
            cutover_month: DEFAULT_CUTOVER_MONTH,
            start_year: DEFAULT_START_YEAR,
            date_label: DEFAULT_DATE_LABEL.to_string(),
            header_seed: None,
        }
    }
}

impl DiscoveryConfig {
    /// Reads and validates a JSON config file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid(format!(
                "concurrency {} exceeds {}",
                self.concurrency,
                Semaphore::MAX_PERMITS
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        if !(1..=12).contains(&self.cutover_month) {
            return Err(ConfigError::Invalid(format!(
                "cutover_month {} outside 1..=12",
                self.cutover_month
            )));
        }
        Ok(())
    }

    /// Pacing delay as a [`Duration`].
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
