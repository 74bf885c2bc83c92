//! Error types for the watcher.

use reqwest::StatusCode;

/// The result type used throughout chanwatch.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a watch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The watched resource no longer exists upstream.
    ///
    /// Depending on
    /// [`WatchConfig::unsubscribe_on_not_found`](crate::config::WatchConfig::unsubscribe_on_not_found),
    /// this ends the subscription after one delivery.
    #[error("resource not found")]
    NotFound,

    /// The upstream answered with a status outside 2xx/304/404.
    ///
    /// Always surfaced to the handler, never fatal on its own; the next tick
    /// retries with the previous staleness marker.
    #[error("unexpected upstream status {status}")]
    Transport {
        /// The offending status code.
        status: StatusCode,
    },

    /// The request failed below the HTTP status layer, or a 2xx body could
    /// not be decoded.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The watcher was constructed with invalid settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Returns true when this is the not-found outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
