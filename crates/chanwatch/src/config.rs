//! Watcher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hard minimum polling interval in seconds, imposed by the upstream API's
/// request-rate rules.
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Maximum staleness skew window in seconds.
pub const MAX_SKEW_SECS: u64 = 3600;

/// Default upstream API host.
pub const DEFAULT_HOST: &str = "a.4cdn.org";

const DEFAULT_INTERVAL_SECS: u64 = 30;
const DEFAULT_SKEW_SECS: u64 = 30;

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_skew_secs() -> u64 {
    DEFAULT_SKEW_SECS
}

fn default_unsubscribe_on_not_found() -> bool {
    true
}

/// Configuration for a [`Watcher`](crate::watch::Watcher).
///
/// Every field has a documented default; deserialization rejects unknown
/// fields rather than silently ignoring them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WatchConfig {
    /// Seconds between polls. Minimum [`MIN_INTERVAL_SECS`], enforced by
    /// [`WatchConfig::validate`]. Default: 30.
    pub interval_secs: u64,

    /// Suppress the first-fetch baseline and report only what changes
    /// afterwards. Default: false.
    pub updates_only: bool,

    /// Stop polling once the watched resource returns not-found.
    /// Default: true.
    pub unsubscribe_on_not_found: bool,

    /// Request over https instead of http. Default: false.
    pub use_https: bool,

    /// Seconds subtracted from the request-issue time when advancing the
    /// `If-Modified-Since` marker. The upstream propagates its own
    /// last-modified values slowly; asking slightly behind the wall clock
    /// trades duplicate data for never missing an update. Default: 30.
    pub skew_secs: u64,

    /// Base URL override (`http://…` or `https://…`) replacing the default
    /// upstream host and `use_https` scheme selection. Primarily for tests
    /// and self-hosted mirrors. Default: none.
    pub endpoint: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            updates_only: false,
            unsubscribe_on_not_found: default_unsubscribe_on_not_found(),
            use_https: false,
            skew_secs: default_skew_secs(),
            endpoint: None,
        }
    }
}

impl WatchConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the interval is below the
    /// upstream minimum, the skew window is out of range, or the endpoint
    /// override is not an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs < MIN_INTERVAL_SECS {
            return Err(Error::invalid_configuration(format!(
                "interval must be at least {MIN_INTERVAL_SECS} seconds to respect upstream rate rules (got {})",
                self.interval_secs
            )));
        }
        if self.skew_secs > MAX_SKEW_SECS {
            return Err(Error::invalid_configuration(format!(
                "skew window must be at most {MAX_SKEW_SECS} seconds (got {})",
                self.skew_secs
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::invalid_configuration(format!(
                    "endpoint must be an http(s) URL (got {endpoint})"
                )));
            }
        }
        Ok(())
    }

    /// The polling interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The staleness skew window.
    #[must_use]
    pub fn skew(&self) -> chrono::Duration {
        let secs = self.skew_secs.min(MAX_SKEW_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
    }

    /// The base URL requests will target, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None if self.use_https => format!("https://{DEFAULT_HOST}"),
            None => format!("http://{DEFAULT_HOST}"),
        }
    }
}
