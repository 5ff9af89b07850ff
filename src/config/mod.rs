use crate::config::error::{ConfigError, ConfigResult};
use std::str::FromStr;
use std::time::Duration;

pub mod error;

pub const DEFAULT_CDDB_URL: &str = "http://gnudb.gnudb.org/~cddb/cddb.cgi";
pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_PROTOCOL_LEVEL: u8 = 6;

const ENV_CDDB_URL: &str = "CD_DECK_CDDB_URL";
const ENV_EMAIL: &str = "CD_DECK_EMAIL";
const ENV_HOSTNAME: &str = "CD_DECK_HOSTNAME";
const ENV_CDDB_TIMEOUT_SECS: &str = "CD_DECK_CDDB_TIMEOUT_SECS";
const ENV_CDDB_REQUESTS_PER_SECOND: &str = "CD_DECK_CDDB_REQUESTS_PER_SECOND";
const ENV_POLL_INTERVAL_MS: &str = "CD_DECK_POLL_INTERVAL_MS";
const ENV_BOUNDARY_CHECK_EVERY: &str = "CD_DECK_BOUNDARY_CHECK_EVERY";

/// Where and as whom metadata queries are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CddbConfig {
    pub server_url: String,
    pub email: String,
    pub hostname: String,
    pub client_name: String,
    pub client_version: String,
    pub protocol_level: u8,
    pub timeout: Duration,
    pub requests_per_second: u64,
}

impl Default for CddbConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_CDDB_URL.to_string(),
            email: "user@example.com".to_string(),
            hostname: "localhost".to_string(),
            client_name: CLIENT_NAME.to_string(),
            client_version: CLIENT_VERSION.to_string(),
            protocol_level: DEFAULT_PROTOCOL_LEVEL,
            timeout: Duration::from_secs(10),
            requests_per_second: 1,
        }
    }
}

impl CddbConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_CDDB_URL) {
            config.server_url = url;
        }
        if let Some(email) = lookup(ENV_EMAIL) {
            config.email = email;
        }
        if let Some(hostname) = lookup(ENV_HOSTNAME) {
            config.hostname = hostname;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_CDDB_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(rate) = parse_var::<u64>(&lookup, ENV_CDDB_REQUESTS_PER_SECOND)? {
            if rate == 0 {
                return Err(invalid(ENV_CDDB_REQUESTS_PER_SECOND, "0"));
            }
            config.requests_per_second = rate;
        }

        Ok(config)
    }

    /// Client identification sent with every request: contact address, host,
    /// client name and version, space separated.
    pub fn hello(&self) -> String {
        format!(
            "{} {} {} {}",
            self.email, self.hostname, self.client_name, self.client_version
        )
    }
}

/// Timing of the playback poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// The track boundary is checked on every Nth position change.
    pub boundary_check_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            boundary_check_threshold: 5,
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(millis) = parse_var::<u64>(&lookup, ENV_POLL_INTERVAL_MS)? {
            if millis == 0 {
                return Err(invalid(ENV_POLL_INTERVAL_MS, "0"));
            }
            config.poll_interval = Duration::from_millis(millis);
        }
        if let Some(every) = parse_var::<u32>(&lookup, ENV_BOUNDARY_CHECK_EVERY)? {
            if every == 0 {
                return Err(invalid(ENV_BOUNDARY_CHECK_EVERY, "0"));
            }
            config.boundary_check_threshold = every;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> ConfigResult<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(key, &value)),
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}
