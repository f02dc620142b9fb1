//! Application configuration management.
//!
//! This module handles loading the collector configuration: remote base URLs,
//! the collection periods (years and how many months of each), the request
//! timeout and the data directory that holds checkpoints and reports.
//!
//! Configuration is read from `~/.config/camaratrack/config.json` unless the
//! `CAMARATRACK_CONFIG` environment variable points elsewhere. A missing file
//! yields the defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "camaratrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "CAMARATRACK_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CAMARATRACK_DATA_DIR";

const DEFAULT_API_BASE_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";
const DEFAULT_SITE_BASE_URL: &str = "https://www.camara.leg.br";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// One collection year and the number of months (starting in January)
/// whose expenses are fetched for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub months: u32,
}

impl Period {
    pub fn new(year: i32, months: u32) -> Self {
        Self { year, months }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub site_base_url: String,
    pub periods: Vec<Period>,
    pub request_timeout_secs: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            site_base_url: DEFAULT_SITE_BASE_URL.to_string(),
            // The final year is still in progress, so only its first months exist.
            periods: vec![Period::new(2019, 12), Period::new(2020, 4)],
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load from `CAMARATRACK_CONFIG` or the default config path, then apply
    /// the data directory override.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(p) => PathBuf::from(p),
            None => Self::config_path()?,
        };
        let mut config = Self::load_from(&path)?;
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.periods.is_empty() {
            bail!("At least one collection period must be configured");
        }
        let mut seen = HashSet::new();
        for period in &self.periods {
            if !(1..=12).contains(&period.months) {
                bail!(
                    "Period {} has {} months; expected 1 to 12",
                    period.year,
                    period.months
                );
            }
            if !seen.insert(period.year) {
                bail!("Period {} is configured more than once", period.year);
            }
        }
        Ok(())
    }

    /// Configured years, in configuration order.
    pub fn years(&self) -> Vec<i32> {
        self.periods.iter().map(|p| p.year).collect()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
