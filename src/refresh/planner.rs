//! Query planning and deduplication for one refresh cycle.
//!
//! The planner discovers every pull request relevant to a user with exactly
//! three scoped search calls. Each query specifically excludes the previous
//! ones so results never overlap, which keeps the remote call count minimal
//! for users watching hundreds of repositories.

use std::collections::HashSet;

use crate::github::error::RefreshError;
use crate::github::gateway::GitHubGateway;
use crate::github::models::SearchHit;
use crate::model::{PullRequestId, UserLogin};

/// Builds the three mutually exclusive scoped queries, in execution order:
/// review-requested, commented, authored.
pub(crate) fn scoped_queries(login: &UserLogin) -> [String; 3] {
    let user = login.as_str();
    [
        format!("review-requested:{user} -author:{user} is:open archived:false"),
        format!("commenter:{user} -author:{user} -review-requested:{user} is:open archived:false"),
        format!("author:{user} is:open archived:false"),
    ]
}

/// Outcome of the planning phase: the deduplicated identifier list plus the
/// review-requested membership set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    ordered_ids: Vec<PullRequestId>,
    review_requested: HashSet<PullRequestId>,
}

impl QueryPlan {
    /// Deduplicated identifiers in first-seen order across the three
    /// queries.
    #[must_use]
    pub fn ordered_ids(&self) -> &[PullRequestId] {
        &self.ordered_ids
    }

    /// True when no query produced any hit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }

    /// True iff the identifier appeared in the review-requested query's
    /// hit set.
    #[must_use]
    pub fn is_review_requested(&self, id: &PullRequestId) -> bool {
        self.review_requested.contains(id)
    }
}

/// Runs the three scoped queries and merges their hits.
///
/// Queries execute sequentially in the fixed order above. Any query failure
/// propagates immediately; the cycle is abandoned with no partial result.
///
/// # Errors
///
/// Propagates the first [`RefreshError`] from the underlying gateway.
pub async fn plan_relevant_pull_requests<G>(
    gateway: &G,
    login: &UserLogin,
) -> Result<QueryPlan, RefreshError>
where
    G: GitHubGateway + ?Sized,
{
    let [review_requested_query, commented_query, authored_query] = scoped_queries(login);

    let review_requested_hits = gateway.search_pull_requests(&review_requested_query).await?;
    let commented_hits = gateway.search_pull_requests(&commented_query).await?;
    let authored_hits = gateway.search_pull_requests(&authored_query).await?;

    let review_requested: HashSet<PullRequestId> = review_requested_hits
        .iter()
        .map(|hit| hit.id.clone())
        .collect();

    let ordered_ids = dedupe_first_seen(
        review_requested_hits
            .into_iter()
            .chain(commented_hits)
            .chain(authored_hits)
            .map(|hit: SearchHit| hit.id),
    );

    Ok(QueryPlan {
        ordered_ids,
        review_requested,
    })
}

/// Deduplicates identifiers preserving first-seen order.
///
/// Per-query exclusivity makes duplicates unlikely, but the remote side is
/// eventually consistent, so an identifier can still surface twice. The
/// earlier occurrence wins its position; later duplicates are dropped.
fn dedupe_first_seen(ids: impl IntoIterator<Item = PullRequestId>) -> Vec<PullRequestId> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for id in ids {
        if seen.insert(id.clone()) {
            unique.push(id);
        }
    }
    unique
}
