//! Bounded retry with server-directed backoff for quota errors.
//!
//! Quota exhaustion is common when a user watches many repositories. The
//! governor replays a rate-limited logical request up to
//! [`RetryPolicy::max_retries`] additional times, sleeping the
//! server-suggested duration before each replay, then lets the error
//! propagate. Attempt state lives in an explicit policy value threaded
//! through the call wrapper, keeping the governor testable in isolation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::error::RefreshError;
use super::gateway::GitHubGateway;
use super::models::{RawPullRequest, SearchHit};
use crate::model::{PullRequestId, PullRequestStatus, RepoReference};

/// Retry budget and fallback backoff for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    fallback_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given retry budget and fallback delay.
    ///
    /// The fallback delay applies when the server does not suggest a wait.
    #[must_use]
    pub const fn new(max_retries: u32, fallback_delay: Duration) -> Self {
        Self {
            max_retries,
            fallback_delay,
        }
    }

    /// Additional attempts allowed after the first failure.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff used when the server suggests no wait.
    #[must_use]
    pub const fn fallback_delay(&self) -> Duration {
        self.fallback_delay
    }
}

impl Default for RetryPolicy {
    /// Two retries (three attempts total) with a one-minute fallback.
    fn default() -> Self {
        Self::new(2, Duration::from_secs(60))
    }
}

/// Runs one logical request under the retry policy.
///
/// Only quota errors are replayed; every other error propagates on the
/// first attempt. After the retry budget is exhausted the quota error
/// propagates as well, which is fatal for the current refresh cycle.
///
/// # Errors
///
/// Returns the final error from `call` once no retry budget remains or the
/// error is not retryable.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, RefreshError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RefreshError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_rate_limited() && attempt < policy.max_retries() => {
                let wait = error
                    .suggested_wait()
                    .unwrap_or_else(|| policy.fallback_delay());
                tracing::warn!(
                    operation,
                    attempt,
                    wait_secs = wait.as_secs(),
                    "rate limited, retrying after server-suggested wait: {error}"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Gateway decorator applying the retry policy to every remote call.
///
/// Wraps the planner's search calls, the bulk loader's fetches, and the
/// ad-hoc status fetch uniformly.
pub struct ThrottledGateway<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G> ThrottledGateway<G>
where
    G: GitHubGateway,
{
    /// Wraps a gateway with the given retry policy.
    #[must_use]
    pub const fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Wraps a gateway with the default policy (two retries).
    #[must_use]
    pub fn with_default_policy(inner: G) -> Self {
        Self::new(inner, RetryPolicy::default())
    }
}

#[async_trait]
impl<G> GitHubGateway for ThrottledGateway<G>
where
    G: GitHubGateway,
{
    async fn search_pull_requests(&self, query: &str) -> Result<Vec<SearchHit>, RefreshError> {
        run_with_retry(&self.policy, "search pull requests", || {
            self.inner.search_pull_requests(query)
        })
        .await
    }

    async fn load_pull_requests_bulk(
        &self,
        ids: &[PullRequestId],
    ) -> Result<Vec<RawPullRequest>, RefreshError> {
        run_with_retry(&self.policy, "load pull requests bulk", || {
            self.inner.load_pull_requests_bulk(ids)
        })
        .await
    }

    async fn pull_request_status(
        &self,
        repo: &RepoReference,
        number: u64,
    ) -> Result<PullRequestStatus, RefreshError> {
        run_with_retry(&self.policy, "pull request status", || {
            self.inner.pull_request_status(repo, number)
        })
        .await
    }
}
