//! The refresh engine: one cycle from scoped queries to canonical records.
//!
//! A cycle runs planner, bulk loader, and normaliser strictly in that
//! order, issuing remote calls sequentially. The engine is stateless across
//! cycles; a failed cycle returns an error and produces no partial output,
//! leaving whatever the caller previously computed untouched.

pub mod bulk;
pub mod normalise;
pub mod planner;

pub use bulk::MAX_BULK_BATCH;
pub use normalise::normalise_pull_request;
pub use planner::QueryPlan;

use crate::github::error::RefreshError;
use crate::github::gateway::GitHubGateway;
use crate::model::{PullRequest, PullRequestStatus, RepoReference, UserLogin};

/// Synchronisation engine over an injected remote gateway.
///
/// Wrap the gateway in [`crate::github::ThrottledGateway`] to apply the
/// rate-limit governor to every call the engine makes.
pub struct RefreshEngine<G> {
    gateway: G,
}

impl<G> RefreshEngine<G>
where
    G: GitHubGateway,
{
    /// Creates an engine over the given gateway.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Runs one refresh cycle for the user, returning the canonical,
    /// unbucketed pull request list.
    ///
    /// Optimises for the minimum number of remote calls: brute-forcing
    /// per-repository listings would quickly exhaust API quota for users
    /// watching several hundred repositories.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RefreshError`] from any remote call; no
    /// partial result is returned for a failed cycle.
    pub async fn refresh(&self, login: &UserLogin) -> Result<Vec<PullRequest>, RefreshError> {
        let plan = planner::plan_relevant_pull_requests(&self.gateway, login).await?;
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let raw_records = bulk::load_in_batches(&self.gateway, plan.ordered_ids()).await?;

        Ok(raw_records
            .into_iter()
            .map(|raw| {
                let review_requested = plan.is_review_requested(&raw.id);
                normalise::normalise_pull_request(raw, review_requested)
            })
            .collect())
    }

    /// Fetches the current status of a single pull request outside the
    /// bulk path.
    ///
    /// # Errors
    ///
    /// Propagates any [`RefreshError`] from the gateway.
    pub async fn pull_request_status(
        &self,
        repo: &RepoReference,
        number: u64,
    ) -> Result<PullRequestStatus, RefreshError> {
        self.gateway.pull_request_status(repo, number).await
    }
}
