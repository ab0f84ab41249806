//! Runtime configuration read from the environment (and `.env`).

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_SHEET_NAME: &str = "Orders";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);
pub const DEFAULT_LOG_FILE: &str = "logs/gops_backlog.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sheet_id: Option<String>,
    pub sheet_name: String,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub refresh_interval: Duration,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    /// Reads `GOPS_*` and `LOG_FILE_PATH` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match get(key) {
                Some(v) => {
                    let n: u64 = v
                        .trim()
                        .parse()
                        .with_context(|| format!("{key} must be a whole number of seconds, got '{v}'"))?;
                    Ok(Duration::from_secs(n))
                }
                None => Ok(default),
            }
        };

        let defaults = Self::default();
        Ok(Self {
            sheet_id: get("GOPS_SHEET_ID"),
            sheet_name: get("GOPS_SHEET_NAME").unwrap_or(defaults.sheet_name),
            cache_ttl: secs("GOPS_CACHE_TTL_SECS", defaults.cache_ttl)?,
            http_timeout: secs("GOPS_HTTP_TIMEOUT_SECS", defaults.http_timeout)?,
            refresh_interval: secs("GOPS_REFRESH_SECS", defaults.refresh_interval)?,
            log_file: get("LOG_FILE_PATH").unwrap_or(defaults.log_file),
        })
    }
}
