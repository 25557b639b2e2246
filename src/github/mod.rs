//! Remote API capability, error taxonomy, and the rate-limit governor.
//!
//! This module wraps Octocrab to run the GraphQL search, bulk-fetch, and
//! status queries the engine depends on. Errors are mapped into precise
//! variants so callers never see Octocrab internals, and every remote call
//! can be wrapped in the bounded-retry governor.

pub mod error;
pub mod gateway;
pub mod models;
pub mod rate_limit;
pub mod retry;

pub use error::RefreshError;
pub use gateway::{GitHubGateway, OctocrabGateway, PersonalAccessToken};
pub use models::{RawPullRequest, SearchHit};
pub use rate_limit::RateLimitInfo;
pub use retry::{RetryPolicy, ThrottledGateway, run_with_retry};

#[cfg(test)]
pub use gateway::MockGitHubGateway;
