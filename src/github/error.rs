//! Error types surfaced by the synchronisation engine.
//!
//! The taxonomy distinguishes transient quota errors, which the retry
//! governor may replay, from everything else, which aborts the current
//! refresh cycle immediately. A failed cycle has no observable effect on
//! previously computed output; callers decide whether to keep last-known
//! results or show an error state.

use std::time::Duration;

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while planning, fetching, or normalising pull requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The user login cannot be embedded in a search query.
    #[error("invalid user login: {message}")]
    InvalidLogin {
        /// Why the login was rejected.
        message: String,
    },

    /// A URL (API base or similar) could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-quota API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Primary rate limit exhausted for the current quota window.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Quota snapshot when it could be fetched from the API.
        rate_limit: Option<RateLimitInfo>,
        /// Server-suggested wait in seconds, when supplied.
        retry_after_secs: Option<u64>,
        /// Error message from GitHub.
        message: String,
    },

    /// Secondary (abuse-detection) rate limit triggered.
    #[error("GitHub secondary rate limit triggered: {message}")]
    SecondaryRateLimit {
        /// Server-suggested wait in seconds, when supplied.
        retry_after_secs: Option<u64>,
        /// Error message from GitHub.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl RefreshError {
    /// Returns true for quota errors that the retry governor may replay.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::SecondaryRateLimit { .. }
        )
    }

    /// Server-suggested wait before retrying the offending call.
    ///
    /// Present only for quota errors. Primary limits without an explicit
    /// retry-after fall back to the reset timestamp of the attached quota
    /// snapshot; secondary limits rely on the governor's fallback delay.
    #[must_use]
    pub fn suggested_wait(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded {
                rate_limit,
                retry_after_secs,
                ..
            } => retry_after_secs
                .map(Duration::from_secs)
                .or_else(|| rate_limit.map(|info| info.wait_until_reset())),
            Self::SecondaryRateLimit {
                retry_after_secs, ..
            } => retry_after_secs.map(Duration::from_secs),
            _ => None,
        }
    }
}
