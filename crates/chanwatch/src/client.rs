//! Conditional-fetch HTTP client.
//!
//! One instance serves exactly one subscription. Every request carries an
//! `If-Modified-Since` header derived from a staleness marker, which starts
//! at the Unix epoch (so the first request is unconditional in effect) and is
//! advanced to (request-issue-time − skew window) after every non-hard-error
//! response. Hard errors leave the marker alone, so the next attempt still
//! asks relative to the last known-good baseline.

use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::header::IF_MODIFIED_SINCE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::WatchConfig;
use crate::error::{Error, Result};
use crate::metrics::{labels, names};
use crate::target::Target;

/// RFC 7231 IMF-fixdate, the HTTP-date form `If-Modified-Since` expects.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// HTTP client that tracks conditional-request staleness state for a single
/// subscription.
#[derive(Debug)]
pub struct ConditionalClient {
    http: reqwest::Client,
    base: String,
    skew: chrono::Duration,
    marker: DateTime<Utc>,
}

impl ConditionalClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &WatchConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base: config.base_url(),
            skew: config.skew(),
            marker: DateTime::UNIX_EPOCH,
        })
    }

    /// Fetches `target`, returning `Ok(None)` when the upstream reports
    /// nothing changed since the staleness marker.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] for a 404 — the marker still advances, since a
    ///   404 is a fresh observation of the resource.
    /// * [`Error::Transport`] for any other non-2xx/304 status — the marker
    ///   does not advance.
    /// * [`Error::Http`] when the request itself or the body decode fails.
    pub async fn fetch<T: DeserializeOwned>(&mut self, target: &Target) -> Result<Option<T>> {
        let url = target.url(&self.base);
        let issued_at = Utc::now();

        let response = self
            .http
            .get(&url)
            .header(IF_MODIFIED_SINCE, self.if_modified_since())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            self.advance(issued_at);
            counter!(names::FETCHES_TOTAL, labels::OUTCOME => "not_modified").increment(1);
            tracing::debug!(%url, "not modified");
            Ok(None)
        } else if status == StatusCode::NOT_FOUND {
            self.advance(issued_at);
            counter!(names::FETCHES_TOTAL, labels::OUTCOME => "not_found").increment(1);
            tracing::debug!(%url, "resource gone");
            Err(Error::NotFound)
        } else if status.is_success() {
            // Marker first: a 2xx counts as a confirmed-fresh observation
            // even if the body later fails to decode.
            self.advance(issued_at);
            counter!(names::FETCHES_TOTAL, labels::OUTCOME => "success").increment(1);
            Ok(Some(response.json::<T>().await?))
        } else {
            counter!(names::FETCHES_TOTAL, labels::OUTCOME => "error").increment(1);
            tracing::warn!(%url, %status, "unexpected upstream status");
            Err(Error::Transport { status })
        }
    }

    fn if_modified_since(&self) -> String {
        self.marker.format(HTTP_DATE_FORMAT).to_string()
    }

    fn advance(&mut self, issued_at: DateTime<Utc>) {
        self.marker = issued_at - self.skew;
        tracing::trace!(marker = %self.marker, "staleness marker advanced");
    }
}
