//! Pipeline configuration.
//!
//! Loaded from an optional JSON file, then overridden from the environment
//! (`.env` is read by the binary before this runs):
//!
//! ```json
//! {
//!   "vehicle_positions_url": "https://example.org/vehicle_positions.pb",
//!   "trip_updates_url": null,
//!   "timezone": "Europe/Rome",
//!   "include_label": true
//! }
//! ```
//!
//! A `null` trip-updates url runs the pipeline on vehicle positions alone.

use std::time::Duration;

use chrono_tz::Tz;
use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::fetch::auth::FeedAuth;

/// Roma Mobilità GTFS-RT vehicle positions feed.
pub const DEFAULT_VEHICLE_POSITIONS_URL: &str =
    "https://romamobilita.it/sites/default/files/rome_rtgtfs_vehicle_positions_feed.pb";

/// Roma Mobilità GTFS-RT trip updates feed.
pub const DEFAULT_TRIP_UPDATES_URL: &str =
    "https://romamobilita.it/sites/default/files/rome_rtgtfs_trip_updates_feed.pb";

pub const ENV_VEHICLE_URL: &str = "ROME_TRANSIT_VEHICLE_URL";
pub const ENV_TRIP_UPDATES_URL: &str = "ROME_TRANSIT_TRIP_UPDATES_URL";
pub const ENV_TIMEZONE: &str = "ROME_TRANSIT_TIMEZONE";
pub const ENV_API_KEY: &str = "ROME_TRANSIT_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub vehicle_positions_url: String,
    pub trip_updates_url: Option<String>,
    pub timezone: String,
    pub include_label: bool,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub auth: FeedAuth,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vehicle_positions_url: DEFAULT_VEHICLE_POSITIONS_URL.to_string(),
            trip_updates_url: Some(DEFAULT_TRIP_UPDATES_URL.to_string()),
            timezone: "Europe/Rome".to_string(),
            include_label: false,
            poll_interval_secs: 10,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            auth: FeedAuth::None,
        }
    }
}

/// A [`PipelineConfig`] whose urls and timezone have been parsed.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub vehicle_positions_url: Url,
    pub trip_updates_url: Option<Url>,
    pub timezone: Tz,
    pub include_label: bool,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub auth: FeedAuth,
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`. Missing keys take their
    /// defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. An empty trip-updates url switches to
    /// vehicles-only mode.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_VEHICLE_URL) {
            self.vehicle_positions_url = url;
        }
        if let Some(url) = lookup(ENV_TRIP_UPDATES_URL) {
            self.trip_updates_url = (!url.trim().is_empty()).then_some(url);
        }
        if let Some(tz) = lookup(ENV_TIMEZONE) {
            self.timezone = tz;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.auth.set_key(key);
        }
        self
    }

    /// Parses and checks every field.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_secs"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_secs"));
        }

        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))?;

        Ok(ResolvedConfig {
            vehicle_positions_url: parse_url(&self.vehicle_positions_url)?,
            trip_updates_url: self.trip_updates_url.as_deref().map(parse_url).transpose()?,
            timezone,
            include_label: self.include_label,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            auth: self.auth.clone(),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
