//! Bucket assignment for the canonical pull request list.
//!
//! Assignment is a single ordered match over the bucket variants, so the
//! precedence (ignored, then mine, then muted, then reviewed, then incoming)
//! is an explicit, testable data structure rather than nested conditionals.
//! The whole pass is a pure function of its inputs; buckets are recomputed
//! wholesale every cycle and never stored.

use chrono::{DateTime, Utc};

use crate::filtering::mute::{MuteConfiguration, is_bot_login};
use crate::model::{PullRequest, ReviewState, UserLogin};

/// The five mutually exclusive output classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Repository-level exclusion; terminal, beats every other rule.
    Ignored,
    /// Authored by the current user.
    Mine,
    /// Matched by an active mute rule.
    Muted,
    /// Already reviewed by the current user, with nothing new since.
    Reviewed,
    /// Awaiting the current user's review.
    Incoming,
}

/// Evaluation order for bucket assignment. Earlier entries win.
const PRECEDENCE: [Bucket; 5] = [
    Bucket::Ignored,
    Bucket::Mine,
    Bucket::Muted,
    Bucket::Reviewed,
    Bucket::Incoming,
];

/// The partitioned output of one bucketing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    /// Pull requests awaiting the user's review.
    pub incoming: Vec<PullRequest>,
    /// Pull requests suppressed by an active mute rule.
    pub muted: Vec<PullRequest>,
    /// Pull requests the user has already reviewed.
    pub reviewed: Vec<PullRequest>,
    /// Pull requests authored by the user.
    pub mine: Vec<PullRequest>,
    /// Pull requests from ignored repositories.
    pub ignored: Vec<PullRequest>,
}

impl Buckets {
    fn push(&mut self, bucket: Bucket, pull_request: PullRequest) {
        match bucket {
            Bucket::Ignored => self.ignored.push(pull_request),
            Bucket::Mine => self.mine.push(pull_request),
            Bucket::Muted => self.muted.push(pull_request),
            Bucket::Reviewed => self.reviewed.push(pull_request),
            Bucket::Incoming => self.incoming.push(pull_request),
        }
    }
}

struct BucketContext<'a> {
    config: &'a MuteConfiguration,
    login: &'a UserLogin,
    now: DateTime<Utc>,
}

impl Bucket {
    fn admits(self, pull_request: &PullRequest, ctx: &BucketContext<'_>) -> bool {
        match self {
            Self::Ignored => ctx.config.is_repository_ignored(&pull_request.repo),
            Self::Mine => is_authored_by(pull_request, ctx.login),
            Self::Muted => ctx.config.is_muted(pull_request, ctx.now),
            Self::Reviewed => {
                has_own_review(pull_request, ctx.login)
                    && !has_new_commits_since_review(pull_request, ctx)
            }
            Self::Incoming => {
                is_directly_involved(pull_request, ctx)
                    || has_new_commits_since_review(pull_request, ctx)
            }
        }
    }
}

/// Partitions pull requests into the five buckets.
///
/// `now` anchors time-based mute expiry so a pass is reproducible. Pull
/// requests that reach the incoming rule but fail its qualification (the
/// direct-request whitelist is on and nothing qualifies them) are dropped
/// from the output entirely.
#[must_use]
pub fn bucket(
    pull_requests: Vec<PullRequest>,
    config: &MuteConfiguration,
    login: &UserLogin,
    now: DateTime<Utc>,
) -> Buckets {
    let ctx = BucketContext { config, login, now };
    let mut buckets = Buckets::default();

    for pull_request in pull_requests {
        if config.exclude_bots
            && pull_request
                .author
                .as_ref()
                .is_some_and(|author| is_bot_login(&author.login))
        {
            continue;
        }
        if let Some(assigned) = PRECEDENCE
            .iter()
            .copied()
            .find(|candidate| candidate.admits(&pull_request, &ctx))
        {
            buckets.push(assigned, pull_request);
        }
    }

    buckets
}

fn is_authored_by(pull_request: &PullRequest, login: &UserLogin) -> bool {
    pull_request
        .author
        .as_ref()
        .is_some_and(|author| author.login == login.as_str())
}

/// True when the user has submitted any non-pending review.
fn has_own_review(pull_request: &PullRequest, login: &UserLogin) -> bool {
    pull_request.reviews.iter().any(|review| {
        review.author_login == login.as_str() && review.state != ReviewState::Pending
    })
}

/// True when new-commit notifications are on and the latest commit
/// postdates the user's last submitted review.
fn has_new_commits_since_review(pull_request: &PullRequest, ctx: &BucketContext<'_>) -> bool {
    if !ctx.config.notify_new_commits {
        return false;
    }
    let Some(last_review) = pull_request
        .reviews
        .iter()
        .filter(|review| {
            review.author_login == ctx.login.as_str() && review.state != ReviewState::Pending
        })
        .filter_map(|review| review.submitted_at)
        .max()
    else {
        return false;
    };
    pull_request
        .commits
        .iter()
        .filter_map(|commit| commit.created_at)
        .max()
        .is_some_and(|latest_commit| latest_commit > last_review)
}

/// The incoming qualification: a direct request, a whitelisted team, or an
/// open whitelist.
fn is_directly_involved(pull_request: &PullRequest, ctx: &BucketContext<'_>) -> bool {
    if !ctx.config.only_direct_requests {
        return true;
    }
    pull_request.review_requested
        || pull_request
            .requested_reviewers
            .iter()
            .any(|reviewer| reviewer == ctx.login.as_str())
        || ctx.config.has_whitelisted_team(pull_request)
}
