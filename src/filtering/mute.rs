//! Externally owned mute and whitelist configuration.
//!
//! The engine only reads this configuration once per bucketing pass; owning
//! and persisting it is the caller's concern. All predicates here are pure
//! so the filtering pipeline stays deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{PullRequest, RepoReference};

/// How long a per-pull-request mute stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MuteUntil {
    /// Muted until explicitly unmuted.
    Forever,
    /// Muted until the pull request is updated again.
    NextUpdate {
        /// When the mute was placed; an update after this lifts it.
        muted_at: DateTime<Utc>,
    },
    /// Muted until a fixed point in time.
    SpecificTime {
        /// When the mute expires.
        until: DateTime<Utc>,
    },
}

/// A mute entry targeting one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutedPullRequest {
    /// Repository holding the pull request.
    pub repo: RepoReference,
    /// Pull request number within the repository.
    pub number: u64,
    /// Expiry rule for the mute.
    pub until: MuteUntil,
}

impl MutedPullRequest {
    fn applies_to(&self, pull_request: &PullRequest, now: DateTime<Utc>) -> bool {
        if self.repo != pull_request.repo || self.number != pull_request.number {
            return false;
        }
        match self.until {
            MuteUntil::Forever => true,
            MuteUntil::NextUpdate { muted_at } => pull_request.updated_at <= muted_at,
            MuteUntil::SpecificTime { until } => now < until,
        }
    }
}

/// Mute, ignore, and whitelist rules applied during bucketing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuteConfiguration {
    /// Per-pull-request mute entries.
    pub muted_pull_requests: Vec<MutedPullRequest>,
    /// Logins whose pull requests are always muted.
    pub muted_authors: Vec<String>,
    /// Repositories excluded wholesale; matches land in the ignored
    /// bucket.
    pub ignored_repositories: Vec<RepoReference>,
    /// When true, only directly requested pull requests (or whitelisted
    /// teams) reach the incoming bucket.
    pub only_direct_requests: bool,
    /// Team names whose review requests count as direct when the
    /// whitelist is enabled.
    pub whitelisted_teams: Vec<String>,
    /// When true, a reviewed pull request returns to incoming once a
    /// commit postdates the user's last review.
    pub notify_new_commits: bool,
    /// When true, pull requests authored by bot accounts are dropped
    /// before bucketing.
    pub exclude_bots: bool,
}

impl MuteConfiguration {
    /// True when the pull request's repository is on the ignore list.
    #[must_use]
    pub fn is_repository_ignored(&self, repo: &RepoReference) -> bool {
        self.ignored_repositories.contains(repo)
    }

    /// True when any active mute rule matches the pull request.
    ///
    /// Repository-level exclusion is not a mute; see
    /// [`Self::is_repository_ignored`].
    #[must_use]
    pub fn is_muted(&self, pull_request: &PullRequest, now: DateTime<Utc>) -> bool {
        if let Some(author) = &pull_request.author
            && self.muted_authors.contains(&author.login)
        {
            return true;
        }
        self.muted_pull_requests
            .iter()
            .any(|entry| entry.applies_to(pull_request, now))
    }

    /// True when a requested team is on the whitelist.
    #[must_use]
    pub fn has_whitelisted_team(&self, pull_request: &PullRequest) -> bool {
        pull_request
            .requested_teams
            .iter()
            .any(|team| self.whitelisted_teams.contains(team))
    }
}

/// Recognises bot accounts by the platform's app-account naming
/// convention.
#[must_use]
pub fn is_bot_login(login: &str) -> bool {
    login.ends_with("[bot]")
}
