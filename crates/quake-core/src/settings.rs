use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use quake_feed::USGS_ALL_MONTH_URL;
use thiserror::Error;

use crate::error::Result;
use crate::regions::ContinentMap;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{key} has an invalid value '{value}': {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

/// Runtime configuration, read from `QUAKEVIEW_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feed_url: String,
    /// A local CSV copy of the feed; takes precedence over `feed_url`.
    pub feed_file: Option<PathBuf>,
    /// TOML replacement for the built-in continent map.
    pub regions_file: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: USGS_ALL_MONTH_URL.to_string(),
            feed_file: None,
            regions_file: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> std::result::Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(url) = get("QUAKEVIEW_FEED_URL") {
            settings.feed_url = url;
        }
        settings.feed_file = get("QUAKEVIEW_FEED_FILE").map(PathBuf::from);
        settings.regions_file = get("QUAKEVIEW_REGIONS_FILE").map(PathBuf::from);

        if let Some(addr) = get("QUAKEVIEW_BIND_ADDR") {
            settings.bind_addr = addr.trim().parse().map_err(|err: std::net::AddrParseError| {
                SettingsError::Invalid {
                    key: "QUAKEVIEW_BIND_ADDR",
                    value: addr.clone(),
                    message: err.to_string(),
                }
            })?;
        }

        if let Some(secs) = get("QUAKEVIEW_HTTP_TIMEOUT_SECS") {
            let parsed: u64 = secs.trim().parse().map_err(|err: std::num::ParseIntError| {
                SettingsError::Invalid {
                    key: "QUAKEVIEW_HTTP_TIMEOUT_SECS",
                    value: secs.clone(),
                    message: err.to_string(),
                }
            })?;
            if parsed == 0 {
                return Err(SettingsError::Invalid {
                    key: "QUAKEVIEW_HTTP_TIMEOUT_SECS",
                    value: secs,
                    message: "timeout must be at least one second".to_string(),
                });
            }
            settings.http_timeout = Duration::from_secs(parsed);
        }

        Ok(settings)
    }

    /// The configured continent map, or the built-in one.
    pub fn load_regions(&self) -> Result<ContinentMap> {
        match &self.regions_file {
            Some(path) => ContinentMap::from_path(path),
            None => ContinentMap::builtin(),
        }
    }
}
