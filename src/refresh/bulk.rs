//! Batched hydration of pull request records.
//!
//! Deduplicated identifiers are partitioned into consecutive batches and
//! fetched sequentially, concatenating results in batch order. Sequential
//! execution keeps the per-cycle call pattern predictable for rate-limit
//! accounting.

use crate::github::error::RefreshError;
use crate::github::gateway::GitHubGateway;
use crate::github::models::RawPullRequest;
use crate::model::PullRequestId;

/// Largest safe bulk-fetch batch size.
///
/// Batches of 100 have been observed to produce server-side 502 failures.
pub const MAX_BULK_BATCH: usize = 50;

/// Fetches full records for the given identifiers in batches of at most
/// [`MAX_BULK_BATCH`].
///
/// An empty input short-circuits to an empty result with zero remote calls.
/// Result order follows batch order and, within a batch, the order returned
/// by the remote API; callers needing timestamp order sort downstream.
///
/// # Errors
///
/// A batch failure aborts the whole load with no partial results.
pub async fn load_in_batches<G>(
    gateway: &G,
    ids: &[PullRequestId],
) -> Result<Vec<RawPullRequest>, RefreshError>
where
    G: GitHubGateway + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(ids.len());
    for batch in ids.chunks(MAX_BULK_BATCH) {
        let part = gateway.load_pull_requests_bulk(batch).await?;
        records.extend(part);
    }

    Ok(records)
}
