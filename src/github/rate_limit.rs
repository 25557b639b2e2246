//! Quota telemetry captured from GitHub API responses.
//!
//! The engine records remaining-quota figures after successful calls (purely
//! observational) and attaches a [`RateLimitInfo`] snapshot to primary
//! rate-limit errors so the retry governor can derive a server-directed
//! backoff from the reset timestamp.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Quota snapshot for the REST rate-limit resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a snapshot from the window size, remaining quota, and the
    /// Unix timestamp at which the window resets.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Duration until the window resets.
    ///
    /// Returns zero if the reset time has already passed or the system
    /// clock cannot be read.
    #[must_use]
    pub fn wait_until_reset(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        Duration::from_secs(self.reset_at.saturating_sub(now))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::RateLimitInfo;

    #[test]
    fn wait_is_zero_when_reset_has_passed() {
        let info = RateLimitInfo::new(5000, 0, 0);
        assert_eq!(info.wait_until_reset(), Duration::ZERO);
    }

    #[test]
    fn wait_is_positive_for_future_reset() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_secs();
        let info = RateLimitInfo::new(5000, 0, now + 120);

        let wait = info.wait_until_reset().as_secs();
        assert!(
            (60..=120).contains(&wait),
            "expected 60..=120 seconds until reset, got {wait}"
        );
    }
}
