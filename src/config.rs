//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

/// Default upstream feed (USGS FDSN event service).
pub const DEFAULT_UPSTREAM_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Location of the cache artifact.
    pub cache_path: PathBuf,

    /// Base URL of the upstream event service.
    pub upstream_url: String,

    /// Seconds between two synchronization attempts.
    pub sync_interval_secs: u64,

    /// Timeout in seconds for a single upstream request.
    pub fetch_timeout_secs: u64,

    /// Fixed `starttime` of the upstream query window.
    pub fetch_start_date: NaiveDate,

    /// Minimum magnitude requested from upstream.
    pub fetch_min_magnitude: f64,

    /// `startDate` applied to queries that do not send one.
    pub query_default_start_date: NaiveDate,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cache_path: PathBuf::from("static/data/sismos.geojson"),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            sync_interval_secs: 6 * 60 * 60,
            fetch_timeout_secs: 15,
            fetch_start_date: NaiveDate::from_ymd_opt(2025, 7, 12).unwrap_or_default(),
            fetch_min_magnitude: 4.5,
            query_default_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the [`Default`] values when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` cannot be parsed as a
    /// [`SocketAddr`] or a date variable is not `YYYY-MM-DD`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let cache_path = std::env::var("CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_path);

        let upstream_url = std::env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url);

        let sync_interval_secs = parse_env("SYNC_INTERVAL_SECS", defaults.sync_interval_secs);
        let fetch_timeout_secs = parse_env("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs);
        let fetch_min_magnitude = parse_env("FETCH_MIN_MAGNITUDE", defaults.fetch_min_magnitude);

        let fetch_start_date = parse_env_date("FETCH_START_DATE", defaults.fetch_start_date)?;
        let query_default_start_date =
            parse_env_date("QUERY_DEFAULT_START_DATE", defaults.query_default_start_date)?;

        Ok(Self {
            listen_addr,
            cache_path,
            upstream_url,
            sync_interval_secs,
            fetch_timeout_secs,
            fetch_start_date,
            fetch_min_magnitude,
            query_default_start_date,
        })
    }

    /// Refresh cadence as a [`Duration`].
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Upstream request timeout as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an ISO calendar date variable. A set but malformed value is an
/// error, not a fallback.
fn parse_env_date(key: &str, default: NaiveDate) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    parse_date_value(key, std::env::var(key).ok(), default)
}

fn parse_date_value(
    key: &str,
    value: Option<String>,
    default: NaiveDate,
) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match value {
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|e| format!("{key}={v}: {e}").into()),
        None => Ok(default),
    }
}
