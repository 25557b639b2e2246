//! The orthogonal open/draft status filter.

use serde::{Deserialize, Serialize};

use crate::filtering::buckets::Buckets;
use crate::model::PullRequest;

/// Which lifecycle states survive the status pass.
///
/// The default keeps everything; disabling both toggles empties every
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFilter {
    /// Keep non-draft (open) pull requests.
    pub open: bool,
    /// Keep draft pull requests.
    pub draft: bool,
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            open: true,
            draft: true,
        }
    }
}

impl StatusFilter {
    /// True when the pull request's draft flag matches an enabled toggle.
    #[must_use]
    pub const fn retains(&self, pull_request: &PullRequest) -> bool {
        if pull_request.draft { self.draft } else { self.open }
    }
}

/// Applies the status filter to every bucket, preserving order within each.
///
/// Bucket membership is unaffected; the pass only thins each bucket.
#[must_use]
pub fn apply_status_filter(buckets: Buckets, filter: &StatusFilter) -> Buckets {
    let retain = |entries: Vec<PullRequest>| -> Vec<PullRequest> {
        entries
            .into_iter()
            .filter(|pull_request| filter.retains(pull_request))
            .collect()
    };

    Buckets {
        incoming: retain(buckets.incoming),
        muted: retain(buckets.muted),
        reviewed: retain(buckets.reviewed),
        mine: retain(buckets.mine),
        ignored: retain(buckets.ignored),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::{StatusFilter, apply_status_filter};
    use crate::filtering::buckets::Buckets;
    use crate::model::{
        Author, ChangeSummary, PullRequest, PullRequestId, RepoReference, ReviewDecision,
    };

    fn pr(id: &str, draft: bool) -> PullRequest {
        PullRequest {
            id: PullRequestId::from(id),
            html_url: format!("https://github.com/octo/repo/pull/{id}"),
            repo: RepoReference::new("octo", "repo"),
            number: 1,
            updated_at: Utc
                .with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
                .single()
                .expect("timestamp should be valid"),
            author: Some(Author {
                login: "someone".to_owned(),
                avatar_url: "https://a".to_owned(),
            }),
            change_summary: ChangeSummary::default(),
            title: id.to_owned(),
            draft,
            mergeable: false,
            review_requested: false,
            requested_reviewers: Vec::new(),
            requested_teams: Vec::new(),
            reviews: Vec::new(),
            comments: Vec::new(),
            commits: Vec::new(),
            review_decision: ReviewDecision::ReviewRequired,
            check_status: None,
        }
    }

    fn mixed_buckets() -> Buckets {
        Buckets {
            incoming: vec![pr("in-open", false), pr("in-draft", true)],
            muted: vec![pr("mu-draft", true)],
            reviewed: vec![pr("re-open", false)],
            mine: vec![pr("mi-open", false), pr("mi-draft", true)],
            ignored: vec![pr("ig-draft", true)],
        }
    }

    fn ids(bucket: &[PullRequest]) -> Vec<&str> {
        bucket.iter().map(|pr| pr.id.as_str()).collect()
    }

    #[rstest]
    fn default_filter_keeps_everything() {
        let buckets = apply_status_filter(mixed_buckets(), &StatusFilter::default());
        assert_eq!(buckets, mixed_buckets());
    }

    #[rstest]
    fn draft_only_filter_keeps_only_drafts_in_every_bucket() {
        let filter = StatusFilter {
            open: false,
            draft: true,
        };
        let buckets = apply_status_filter(mixed_buckets(), &filter);

        assert_eq!(ids(&buckets.incoming), vec!["in-draft"]);
        assert_eq!(ids(&buckets.muted), vec!["mu-draft"]);
        assert!(buckets.reviewed.is_empty());
        assert_eq!(ids(&buckets.mine), vec!["mi-draft"]);
        assert_eq!(ids(&buckets.ignored), vec!["ig-draft"]);
    }

    #[rstest]
    fn disabling_both_toggles_empties_every_bucket() {
        let filter = StatusFilter {
            open: false,
            draft: false,
        };
        let buckets = apply_status_filter(mixed_buckets(), &filter);
        assert_eq!(buckets, Buckets::default());
    }
}
