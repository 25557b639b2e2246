//! Normalisation of raw bulk records into canonical pull requests.

use crate::github::models::{MergeableState, RawPullRequest};
use crate::model::{
    Author, ChangeSummary, CommentSummary, CommitSummary, PullRequest, Review,
};

/// Maps one validated bulk record into the canonical entity.
///
/// `review_requested` comes from planner membership, never from the raw
/// record's own review fields. The tri-state mergeable value collapses to a
/// boolean that is true only for an explicit "mergeable"; conflicting and
/// unknown both map to false.
#[must_use]
pub fn normalise_pull_request(raw: RawPullRequest, review_requested: bool) -> PullRequest {
    let reviews = raw
        .reviews
        .into_iter()
        .map(|review| Review {
            author_login: review.author_login,
            state: review.state,
            submitted_at: review.submitted_at,
        })
        .collect();

    let comments = raw
        .comments
        .into_iter()
        .map(|comment| CommentSummary {
            author_login: comment.author_login,
            created_at: comment.created_at,
        })
        .collect();

    // At most one synthetic commit, kept only when it carries a timestamp.
    let commits = raw
        .last_commit
        .and_then(|commit| commit.created_at)
        .map(|created_at| {
            vec![CommitSummary {
                author_login: String::new(),
                created_at: Some(created_at),
            }]
        })
        .unwrap_or_default();

    PullRequest {
        id: raw.id,
        html_url: raw.url,
        repo: raw.repository,
        number: raw.number,
        updated_at: raw.updated_at,
        author: raw.author.map(|author| Author {
            login: author.login,
            avatar_url: author.avatar_url,
        }),
        change_summary: ChangeSummary {
            changed_files: raw.changed_files,
            additions: raw.additions,
            deletions: raw.deletions,
        },
        title: raw.title,
        draft: raw.is_draft,
        mergeable: raw.mergeable == MergeableState::Mergeable,
        review_requested,
        requested_reviewers: drop_empty(raw.requested_reviewers),
        requested_teams: drop_empty(raw.requested_teams),
        reviews,
        comments,
        commits,
        review_decision: raw.review_decision,
        check_status: raw.last_commit.and_then(|commit| commit.check_status),
    }
}

/// Drops empty entries; an absent list has already normalised to empty.
fn drop_empty(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|value| !value.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::normalise_pull_request;
    use crate::github::models::{MergeableState, RawAuthor, RawCommit, RawPullRequest};
    use crate::model::{CheckStatus, PullRequestId, RepoReference, ReviewDecision};

    fn sample_raw() -> RawPullRequest {
        RawPullRequest {
            id: PullRequestId::from("PR_1"),
            url: "https://github.com/octo/repo/pull/1".to_owned(),
            title: "Add feature".to_owned(),
            updated_at: Utc
                .with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
                .single()
                .expect("timestamp should be valid"),
            number: 1,
            is_draft: false,
            mergeable: MergeableState::Unknown,
            additions: 10,
            deletions: 2,
            changed_files: 3,
            author: Some(RawAuthor {
                login: "octocat".to_owned(),
                avatar_url: "https://a".to_owned(),
            }),
            repository: RepoReference::new("octo", "repo"),
            requested_reviewers: vec![String::new(), "alice".to_owned()],
            requested_teams: vec!["core".to_owned(), String::new()],
            reviews: Vec::new(),
            comments: Vec::new(),
            last_commit: Some(RawCommit {
                created_at: Utc.with_ymd_and_hms(2025, 5, 31, 7, 0, 0).single(),
                check_status: Some(CheckStatus::Success),
            }),
            review_decision: ReviewDecision::ReviewRequired,
        }
    }

    #[rstest]
    #[case(MergeableState::Mergeable, true)]
    #[case(MergeableState::Conflicting, false)]
    #[case(MergeableState::Unknown, false)]
    fn mergeable_is_true_only_for_explicit_mergeable(
        #[case] state: MergeableState,
        #[case] expected: bool,
    ) {
        let mut raw = sample_raw();
        raw.mergeable = state;
        assert_eq!(normalise_pull_request(raw, false).mergeable, expected);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn review_requested_comes_from_planner_membership(#[case] requested: bool) {
        let normalised = normalise_pull_request(sample_raw(), requested);
        assert_eq!(normalised.review_requested, requested);
    }

    #[rstest]
    fn empty_entries_are_dropped_from_request_lists() {
        let normalised = normalise_pull_request(sample_raw(), false);
        assert_eq!(normalised.requested_reviewers, vec!["alice".to_owned()]);
        assert_eq!(normalised.requested_teams, vec!["core".to_owned()]);
    }

    #[rstest]
    fn last_commit_collapses_to_one_synthetic_record() {
        let normalised = normalise_pull_request(sample_raw(), false);
        assert_eq!(normalised.commits.len(), 1);
        let commit = normalised.commits.first().expect("commit should exist");
        assert!(
            commit.author_login.is_empty(),
            "synthetic commit must carry no attribution"
        );
        assert!(commit.created_at.is_some());
        assert_eq!(normalised.check_status, Some(CheckStatus::Success));
    }

    #[rstest]
    fn commit_without_timestamp_yields_no_synthetic_record() {
        let mut raw = sample_raw();
        raw.last_commit = Some(RawCommit {
            created_at: None,
            check_status: Some(CheckStatus::Pending),
        });
        let normalised = normalise_pull_request(raw, false);
        assert!(normalised.commits.is_empty());
        assert_eq!(
            normalised.check_status,
            Some(CheckStatus::Pending),
            "check status survives even without a commit timestamp"
        );
    }

    #[rstest]
    fn deleted_author_stays_absent() {
        let mut raw = sample_raw();
        raw.author = None;
        assert!(normalise_pull_request(raw, false).author.is_none());
    }
}
