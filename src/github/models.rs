//! Raw bulk records and the GraphQL wire layer behind them.
//!
//! The gateway deserialises GraphQL responses into permissive wire structs
//! (every field optional) and validates them exhaustively at this boundary,
//! producing [`RawPullRequest`] values with all required fields present.
//! Nodes that are not pull requests or that lack required fields are skipped
//! rather than failing the batch, since the bulk API legitimately omits
//! deleted or inaccessible nodes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{CheckStatus, PullRequestId, RepoReference, ReviewDecision, ReviewState};

/// A single search hit: just the node identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Platform node identifier of the matched pull request.
    pub id: PullRequestId,
}

/// Tri-state mergeability reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    /// No conflicts with the base branch.
    Mergeable,
    /// Conflicts with the base branch.
    Conflicting,
    /// Mergeability has not been computed yet.
    Unknown,
}

/// Author identity as returned by the bulk fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAuthor {
    /// Author login.
    pub login: String,
    /// Avatar image reference.
    pub avatar_url: String,
}

/// A review entry from the bulk fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    /// Reviewer login, empty when the account was deleted.
    pub author_login: String,
    /// Review state.
    pub state: ReviewState,
    /// Submission time, absent for pending reviews.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A comment entry from the bulk fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    /// Commenter login, empty when the account was deleted.
    pub author_login: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Most-recent-commit detail from the bulk fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCommit {
    /// Commit creation time when reported.
    pub created_at: Option<DateTime<Utc>>,
    /// Combined check state when reported.
    pub check_status: Option<CheckStatus>,
}

/// Fully validated bulk record for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPullRequest {
    /// Platform node identifier.
    pub id: PullRequestId,
    /// Web URL.
    pub url: String,
    /// Title.
    pub title: String,
    /// Last-updated timestamp.
    pub updated_at: DateTime<Utc>,
    /// Sequence number within the repository.
    pub number: u64,
    /// Draft flag.
    pub is_draft: bool,
    /// Tri-state mergeability.
    pub mergeable: MergeableState,
    /// Lines added.
    pub additions: u64,
    /// Lines removed.
    pub deletions: u64,
    /// Files changed.
    pub changed_files: u64,
    /// Author, absent when the account was deleted.
    pub author: Option<RawAuthor>,
    /// Owning repository.
    pub repository: RepoReference,
    /// Logins of directly requested reviewers.
    pub requested_reviewers: Vec<String>,
    /// Names of requested teams.
    pub requested_teams: Vec<String>,
    /// Reviews in platform order.
    pub reviews: Vec<RawReview>,
    /// Comments in platform order.
    pub comments: Vec<RawComment>,
    /// Most recent commit when reported.
    pub last_commit: Option<RawCommit>,
    /// Aggregate review decision.
    pub review_decision: ReviewDecision,
}

// --- Wire structs (GraphQL response shapes) ---

#[derive(Debug, Deserialize)]
pub(super) struct WireQuota {
    pub(super) cost: Option<u64>,
    pub(super) remaining: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WirePageInfo {
    #[serde(rename = "hasNextPage")]
    pub(super) has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub(super) end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireConnection<T> {
    #[serde(default = "Option::default")]
    pub(super) nodes: Option<Vec<Option<T>>>,
}

impl<T> WireConnection<T> {
    /// Flattens the connection, dropping null nodes.
    pub(super) fn into_nodes(self) -> Vec<T> {
        self.nodes.unwrap_or_default().into_iter().flatten().collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireSearchNode {
    #[serde(rename = "__typename")]
    pub(super) typename: Option<String>,
    pub(super) id: Option<String>,
}

impl WireSearchNode {
    pub(super) fn into_hit(self) -> Option<SearchHit> {
        if self.typename.as_deref() != Some("PullRequest") {
            return None;
        }
        let id = self.id.filter(|value| !value.is_empty())?;
        Some(SearchHit {
            id: PullRequestId::new(id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireActor {
    pub(super) login: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub(super) avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireRepository {
    pub(super) name: Option<String>,
    pub(super) owner: Option<WireActor>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireRequestedReviewer {
    #[serde(rename = "__typename")]
    pub(super) typename: Option<String>,
    pub(super) login: Option<String>,
    pub(super) name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireReviewRequest {
    #[serde(rename = "requestedReviewer")]
    pub(super) requested_reviewer: Option<WireRequestedReviewer>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireReview {
    pub(super) author: Option<WireActor>,
    pub(super) state: Option<ReviewState>,
    #[serde(rename = "submittedAt")]
    pub(super) submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireComment {
    pub(super) author: Option<WireActor>,
    #[serde(rename = "createdAt")]
    pub(super) created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireStatusCheckRollup {
    pub(super) state: Option<CheckStatus>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireCommitDetail {
    #[serde(rename = "committedDate")]
    pub(super) committed_date: Option<DateTime<Utc>>,
    #[serde(rename = "statusCheckRollup")]
    pub(super) status_check_rollup: Option<WireStatusCheckRollup>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireCommitNode {
    pub(super) commit: Option<WireCommitDetail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireBulkNode {
    #[serde(rename = "__typename")]
    pub(super) typename: Option<String>,
    pub(super) id: Option<String>,
    pub(super) url: Option<String>,
    pub(super) title: Option<String>,
    #[serde(rename = "updatedAt")]
    pub(super) updated_at: Option<DateTime<Utc>>,
    pub(super) number: Option<u64>,
    #[serde(rename = "isDraft")]
    pub(super) is_draft: Option<bool>,
    pub(super) mergeable: Option<MergeableState>,
    pub(super) additions: Option<u64>,
    pub(super) deletions: Option<u64>,
    #[serde(rename = "changedFiles")]
    pub(super) changed_files: Option<u64>,
    pub(super) author: Option<WireActor>,
    pub(super) repository: Option<WireRepository>,
    #[serde(rename = "reviewDecision")]
    pub(super) review_decision: Option<ReviewDecision>,
    #[serde(rename = "reviewRequests")]
    pub(super) review_requests: Option<WireConnection<WireReviewRequest>>,
    pub(super) reviews: Option<WireConnection<WireReview>>,
    pub(super) comments: Option<WireConnection<WireComment>>,
    pub(super) commits: Option<WireConnection<WireCommitNode>>,
}

impl WireBulkNode {
    /// Validates the node into a [`RawPullRequest`].
    ///
    /// Returns `None` (caller skips the node) when the node is not a pull
    /// request or any required scalar is missing.
    pub(super) fn into_raw(self) -> Option<RawPullRequest> {
        if self.typename.as_deref() != Some("PullRequest") {
            return None;
        }

        let repository = self.repository?;
        let repo = RepoReference::new(repository.owner?.login?, repository.name?);

        let (requested_reviewers, requested_teams) = split_review_requests(
            self.review_requests
                .map(WireConnection::into_nodes)
                .unwrap_or_default(),
        );

        let reviews = self
            .reviews
            .map(WireConnection::into_nodes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|review| {
                Some(RawReview {
                    author_login: review.author.and_then(|a| a.login).unwrap_or_default(),
                    state: review.state?,
                    submitted_at: review.submitted_at,
                })
            })
            .collect();

        let comments = self
            .comments
            .map(WireConnection::into_nodes)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|comment| {
                Some(RawComment {
                    author_login: comment.author.and_then(|a| a.login).unwrap_or_default(),
                    created_at: comment.created_at?,
                })
            })
            .collect();

        let last_commit = self
            .commits
            .map(WireConnection::into_nodes)
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|node| node.commit)
            .map(|commit| RawCommit {
                created_at: commit.committed_date,
                check_status: commit.status_check_rollup.and_then(|rollup| rollup.state),
            });

        Some(RawPullRequest {
            id: PullRequestId::new(self.id?),
            url: self.url?,
            title: self.title?,
            updated_at: self.updated_at?,
            number: self.number?,
            is_draft: self.is_draft?,
            mergeable: self.mergeable.unwrap_or(MergeableState::Unknown),
            additions: self.additions.unwrap_or(0),
            deletions: self.deletions.unwrap_or(0),
            changed_files: self.changed_files.unwrap_or(0),
            author: self.author.and_then(|actor| {
                Some(RawAuthor {
                    login: actor.login?,
                    avatar_url: actor.avatar_url.unwrap_or_default(),
                })
            }),
            repository: repo,
            requested_reviewers,
            requested_teams,
            reviews,
            comments,
            last_commit,
            review_decision: self.review_decision.unwrap_or(ReviewDecision::ReviewRequired),
        })
    }
}

/// Splits review requests into user logins and team names.
fn split_review_requests(requests: Vec<WireReviewRequest>) -> (Vec<String>, Vec<String>) {
    let mut reviewers = Vec::new();
    let mut teams = Vec::new();
    for request in requests {
        let Some(reviewer) = request.requested_reviewer else {
            continue;
        };
        match reviewer.typename.as_deref() {
            Some("User") => {
                if let Some(login) = reviewer.login {
                    reviewers.push(login);
                }
            }
            Some("Team") => {
                if let Some(name) = reviewer.name {
                    teams.push(name);
                }
            }
            _ => {}
        }
    }
    (reviewers, teams)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{WireBulkNode, WireSearchNode};
    use crate::model::ReviewDecision;

    fn bulk_node(value: serde_json::Value) -> WireBulkNode {
        serde_json::from_value(value).expect("wire node should deserialise")
    }

    fn complete_node() -> serde_json::Value {
        json!({
            "__typename": "PullRequest",
            "id": "PR_1",
            "url": "https://github.com/octo/repo/pull/1",
            "title": "Add feature",
            "updatedAt": "2025-06-01T10:00:00Z",
            "number": 1,
            "isDraft": false,
            "mergeable": "MERGEABLE",
            "additions": 10,
            "deletions": 2,
            "changedFiles": 3,
            "author": { "login": "octocat", "avatarUrl": "https://avatars/octocat" },
            "repository": { "name": "repo", "owner": { "login": "octo" } },
            "reviewDecision": "REVIEW_REQUIRED",
            "reviewRequests": { "nodes": [
                { "requestedReviewer": { "__typename": "User", "login": "alice" } },
                { "requestedReviewer": { "__typename": "Team", "name": "core" } },
                { "requestedReviewer": null },
                null
            ]},
            "reviews": { "nodes": [
                { "author": { "login": "alice" }, "state": "APPROVED",
                  "submittedAt": "2025-06-01T09:00:00Z" },
                null
            ]},
            "comments": { "nodes": [
                { "author": null, "createdAt": "2025-05-30T08:00:00Z" }
            ]},
            "commits": { "nodes": [
                { "commit": { "committedDate": "2025-05-31T07:00:00Z",
                              "statusCheckRollup": { "state": "SUCCESS" } } }
            ]}
        })
    }

    #[test]
    fn validates_a_complete_node() {
        let raw = bulk_node(complete_node())
            .into_raw()
            .expect("complete node should validate");

        assert_eq!(raw.id.as_str(), "PR_1");
        assert_eq!(raw.repository.owner, "octo");
        assert_eq!(raw.requested_reviewers, vec!["alice".to_owned()]);
        assert_eq!(raw.requested_teams, vec!["core".to_owned()]);
        assert_eq!(raw.reviews.len(), 1, "null review nodes should be dropped");
        assert_eq!(
            raw.comments.first().map(|c| c.author_login.as_str()),
            Some(""),
            "deleted comment author should map to an empty login"
        );
        let commit = raw.last_commit.expect("last commit should be present");
        assert!(commit.created_at.is_some());
    }

    #[test]
    fn skips_non_pull_request_nodes() {
        let node = bulk_node(json!({ "__typename": "Issue", "id": "I_1" }));
        assert!(node.into_raw().is_none());
    }

    #[test]
    fn skips_nodes_missing_required_fields() {
        let mut value = complete_node();
        value
            .as_object_mut()
            .expect("node should be an object")
            .remove("updatedAt");
        assert!(bulk_node(value).into_raw().is_none());
    }

    #[test]
    fn missing_review_decision_defaults_to_review_required() {
        let mut value = complete_node();
        value
            .as_object_mut()
            .expect("node should be an object")
            .remove("reviewDecision");
        let raw = bulk_node(value).into_raw().expect("node should validate");
        assert_eq!(raw.review_decision, ReviewDecision::ReviewRequired);
    }

    #[test]
    fn deleted_author_maps_to_absent() {
        let mut value = complete_node();
        value
            .as_object_mut()
            .expect("node should be an object")
            .insert("author".to_owned(), serde_json::Value::Null);
        let raw = bulk_node(value).into_raw().expect("node should validate");
        assert!(raw.author.is_none());
    }

    #[test]
    fn search_node_keeps_only_pull_request_hits() {
        let hit: WireSearchNode =
            serde_json::from_value(json!({ "__typename": "PullRequest", "id": "PR_9" }))
                .expect("search node should deserialise");
        assert_eq!(
            hit.into_hit().map(|h| h.id.as_str().to_owned()),
            Some("PR_9".to_owned())
        );

        let issue: WireSearchNode =
            serde_json::from_value(json!({ "__typename": "Issue", "id": "I_9" }))
                .expect("search node should deserialise");
        assert!(issue.into_hit().is_none());
    }
}
