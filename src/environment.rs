use std::env;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::enrich::ConcurrencyLimit;
use crate::error::ConfigError;
use crate::fetch::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};

pub const DATASET_ENV: &str = "METFALL_DATASET";
pub const MAX_CONCURRENCY_ENV: &str = "METFALL_MAX_CONCURRENCY";
pub const REQUEST_TIMEOUT_ENV: &str = "METFALL_REQUEST_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "METFALL_USER_AGENT";
pub const LOG_DIR_ENV: &str = "METFALL_LOG_DIR";
pub const REPORT_OMIT_ENV: &str = "METFALL_REPORT_OMIT";

pub const DEFAULT_DATASET: &str = "datasets/metbull_data.json";

/// Splits a list-valued setting on `delimiter`, dropping empty entries.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Runtime settings, read from the environment with defaults for anything unset.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Local path or http(s) URL of the JSON dataset.
    pub dataset: String,
    pub max_concurrency: ConcurrencyLimit,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub log_dir: PathBuf,
    pub report_omit: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            max_concurrency: ConcurrencyLimit::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_dir: PathBuf::from("logs"),
            report_omit: Vec::new(),
        }
    }
}

impl Settings {
    /// Unset variables fall back to defaults; set but malformed ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let max_concurrency = match lookup(MAX_CONCURRENCY_ENV) {
            Some(value) => ConcurrencyLimit::parse(&value)?,
            None => defaults.max_concurrency,
        };
        let request_timeout = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(value) => parse_timeout(&value)?,
            None => defaults.request_timeout,
        };
        let report_omit = lookup(REPORT_OMIT_ENV)
            .map(|value| split_list(&value, ';'))
            .unwrap_or_default();

        Ok(Self {
            dataset: lookup(DATASET_ENV).unwrap_or(defaults.dataset),
            max_concurrency,
            request_timeout,
            user_agent: lookup(USER_AGENT_ENV).unwrap_or(defaults.user_agent),
            log_dir: lookup(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            report_omit,
        })
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}
