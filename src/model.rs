//! Canonical pull request entities produced by a refresh cycle.
//!
//! Every refresh cycle rebuilds these records wholesale from remote data.
//! They are never mutated in place; the previous cycle's snapshot is either
//! discarded or persisted by the caller. Raw wire records live in
//! [`crate::github::models`]; the normaliser in [`crate::refresh`] converts
//! them into the types defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::error::RefreshError;

/// Opaque platform-assigned pull request identifier.
///
/// Unique per pull request across its entire lifetime. Used as the
/// deduplication key by the query planner and as the bulk-fetch request key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(String);

impl PullRequestId {
    /// Wraps a platform node identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for PullRequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// User login wrapper to avoid stringly typed parameters.
///
/// The login is interpolated into search queries, so it must not contain
/// whitespace or query operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserLogin(String);

impl UserLogin {
    /// Validates and wraps a user login.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::InvalidLogin`] when the login is blank or
    /// contains characters that would corrupt a search query.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RefreshError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RefreshError::InvalidLogin {
                message: "login must not be blank".to_owned(),
            });
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(RefreshError::InvalidLogin {
                message: format!("login `{trimmed}` contains query metacharacters"),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the login value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Owning repository of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoReference {
    /// Owner login (user or organisation).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoReference {
    /// Creates a reference from owner and name.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Pull request author identity.
///
/// Absent entirely (never a placeholder login) when the account was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author login.
    pub login: String,
    /// Avatar image reference.
    pub avatar_url: String,
}

/// Aggregate change size of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Number of files changed.
    pub changed_files: u64,
    /// Lines added.
    pub additions: u64,
    /// Lines removed.
    pub deletions: u64,
}

/// State of a single submitted review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Review started but not submitted.
    Pending,
    /// Review submitted with comments only.
    Commented,
    /// Review submitted requesting changes.
    ChangesRequested,
    /// Review submitted approving the changes.
    Approved,
    /// Review dismissed after submission.
    Dismissed,
}

/// A single review on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Login of the reviewer. Empty when the account was deleted.
    pub author_login: String,
    /// Review state.
    pub state: ReviewState,
    /// Submission time, absent for pending reviews.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A single discussion comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    /// Login of the commenter. Empty when the account was deleted.
    pub author_login: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Most-recent-commit summary.
///
/// The bulk path collapses the commit list to at most one synthetic record
/// carrying only a creation timestamp. The author login is intentionally
/// blank for that record; it is a carrier for recency, not attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Commit author login, blank for the synthetic bulk record.
    pub author_login: String,
    /// Commit creation time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregate review decision computed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    /// The pull request has the required approvals.
    Approved,
    /// At least one reviewer requested changes.
    ChangesRequested,
    /// A review is still required.
    ReviewRequired,
}

/// Combined check state of the most recent commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// A check errored before completing.
    Error,
    /// A check is expected but has not reported.
    Expected,
    /// A check failed.
    Failure,
    /// Checks are still running.
    Pending,
    /// All checks passed.
    Success,
}

/// Result of the ad-hoc single pull request status fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestStatus {
    /// Aggregate review decision.
    pub review_decision: ReviewDecision,
    /// Check state of the latest commit when reported.
    pub check_status: Option<CheckStatus>,
}

/// Canonical pull request entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Platform-assigned identifier.
    pub id: PullRequestId,
    /// Web URL for display.
    pub html_url: String,
    /// Owning repository.
    pub repo: RepoReference,
    /// Pull request sequence number within the repository.
    pub number: u64,
    /// Last-updated timestamp.
    pub updated_at: DateTime<Utc>,
    /// Author identity, absent when the account was deleted.
    pub author: Option<Author>,
    /// Aggregate change size.
    pub change_summary: ChangeSummary,
    /// Title.
    pub title: String,
    /// Whether the pull request is a draft.
    pub draft: bool,
    /// True only when the platform reported the tri-state value as
    /// explicitly mergeable. Both "conflicting" and "unknown" collapse to
    /// false, so callers must not infer "no conflict" from false.
    pub mergeable: bool,
    /// True iff the identifier appeared in the review-requested scoped
    /// query's hit set. Derived by the planner, not read from the record.
    pub review_requested: bool,
    /// Logins of directly requested reviewers.
    pub requested_reviewers: Vec<String>,
    /// Names of requested teams.
    pub requested_teams: Vec<String>,
    /// Submitted reviews in platform order.
    pub reviews: Vec<Review>,
    /// Discussion comments in platform order.
    pub comments: Vec<CommentSummary>,
    /// At most one synthetic most-recent-commit record.
    pub commits: Vec<CommitSummary>,
    /// Aggregate review decision.
    pub review_decision: ReviewDecision,
    /// Check state of the latest commit when reported.
    pub check_status: Option<CheckStatus>,
}
