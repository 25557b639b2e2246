//! Remote API capability backed by the GitHub GraphQL endpoint.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests. The gateway exposes exactly
//! the three operations the engine consumes: scoped search, bulk fetch by
//! node id, and ad-hoc single pull request status. Search pagination is
//! exhausted internally before returning.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::Octocrab;
use serde::Deserialize;
use url::Url;

use super::error::RefreshError;
use super::models::{
    RawPullRequest, SearchHit, WireBulkNode, WireConnection, WirePageInfo, WireQuota,
    WireSearchNode,
};
use super::rate_limit::RateLimitInfo;
use crate::model::{PullRequestId, PullRequestStatus, RepoReference, ReviewDecision};

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, RefreshError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RefreshError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Gateway over the remote platform's search, bulk-fetch, and status
/// operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubGateway: Send + Sync {
    /// Returns every pull request hit for the search query, exhausting
    /// pagination internally.
    ///
    /// The query is the scoped portion only; the gateway prepends `is:pr`.
    async fn search_pull_requests(&self, query: &str) -> Result<Vec<SearchHit>, RefreshError>;

    /// Hydrates full records for the given node identifiers.
    ///
    /// Callers bound the input to at most
    /// [`crate::refresh::MAX_BULK_BATCH`] identifiers per call.
    async fn load_pull_requests_bulk(
        &self,
        ids: &[PullRequestId],
    ) -> Result<Vec<RawPullRequest>, RefreshError>;

    /// Fetches the current review decision and check status of one pull
    /// request (the secondary, lower-frequency refresh path).
    async fn pull_request_status(
        &self,
        repo: &RepoReference,
        number: u64,
    ) -> Result<PullRequestStatus, RefreshError>;
}

const SEARCH_QUERY: &str = "
query SearchPullRequests($query: String!, $cursor: String) {
  rateLimit { cost remaining }
  search(query: $query, type: ISSUE, first: 100, after: $cursor) {
    pageInfo { hasNextPage endCursor }
    nodes {
      __typename
      ... on PullRequest { id }
    }
  }
}";

const BULK_QUERY: &str = "
query LoadPullRequestsBulk($ids: [ID!]!) {
  rateLimit { cost remaining }
  nodes(ids: $ids) {
    __typename
    ... on PullRequest {
      id
      url
      title
      updatedAt
      number
      isDraft
      mergeable
      additions
      deletions
      changedFiles
      author { login avatarUrl }
      repository { name owner { login } }
      reviewDecision
      reviewRequests(first: 100) {
        nodes {
          requestedReviewer {
            __typename
            ... on User { login }
            ... on Team { name }
          }
        }
      }
      reviews(last: 100) { nodes { author { login } state submittedAt } }
      comments(last: 100) { nodes { author { login } createdAt } }
      commits(last: 1) {
        nodes { commit { committedDate statusCheckRollup { state } } }
      }
    }
  }
}";

const STATUS_QUERY: &str = "
query PullRequestStatus($owner: String!, $name: String!, $pullNumber: Int!) {
  rateLimit { cost remaining }
  repository(owner: $owner, name: $name) {
    pullRequest(number: $pullNumber) {
      reviewDecision
      commits(last: 1) {
        nodes { commit { statusCheckRollup { state } } }
      }
    }
  }
}";

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEntry {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "rateLimit")]
    rate_limit: Option<WireQuota>,
    search: Option<SearchConnection>,
}

#[derive(Debug, Deserialize)]
struct SearchConnection {
    #[serde(rename = "pageInfo")]
    page_info: WirePageInfo,
    nodes: Option<Vec<Option<WireSearchNode>>>,
}

#[derive(Debug, Deserialize)]
struct BulkData {
    #[serde(rename = "rateLimit")]
    rate_limit: Option<WireQuota>,
    nodes: Option<Vec<Option<WireBulkNode>>>,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    #[serde(rename = "rateLimit")]
    rate_limit: Option<WireQuota>,
    repository: Option<StatusRepository>,
}

#[derive(Debug, Deserialize)]
struct StatusRepository {
    #[serde(rename = "pullRequest")]
    pull_request: Option<StatusPullRequest>,
}

#[derive(Debug, Deserialize)]
struct StatusPullRequest {
    #[serde(rename = "reviewDecision")]
    review_decision: Option<ReviewDecision>,
    commits: Option<WireConnection<super::models::WireCommitNode>>,
}

/// Octocrab-backed gateway.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an authenticated gateway against the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::InvalidUrl`] when the base URI cannot be
    /// parsed or [`RefreshError::Api`] when Octocrab fails to construct a
    /// client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, RefreshError> {
        let base_uri: Uri = api_base
            .as_str()
            .parse::<Uri>()
            .map_err(|error| RefreshError::InvalidUrl(error.to_string()))?;

        let client = Octocrab::builder()
            .personal_token(token.as_ref())
            .base_uri(base_uri)
            .map_err(|error| RefreshError::Api {
                message: format!("build client failed: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;

        Ok(Self::new(client))
    }

    async fn graphql<T>(
        &self,
        operation: &str,
        payload: &serde_json::Value,
    ) -> Result<T, RefreshError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response: GraphResponse<T> = match self.client.graphql(payload).await {
            Ok(response) => response,
            Err(error) => return Err(self.map_error(operation, &error).await),
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            return Err(self.map_graphql_errors(operation, &errors).await);
        }

        response.data.ok_or_else(|| RefreshError::Api {
            message: format!("{operation} returned an empty GraphQL response"),
        })
    }

    async fn map_graphql_errors(
        &self,
        operation: &str,
        errors: &[GraphErrorEntry],
    ) -> RefreshError {
        let message = errors
            .iter()
            .filter_map(|entry| entry.message.as_deref())
            .collect::<Vec<_>>()
            .join("; ");

        let rate_limited = errors.iter().any(|entry| {
            entry.kind.as_deref() == Some("RATE_LIMITED")
                || entry
                    .message
                    .as_deref()
                    .is_some_and(|text| text.to_lowercase().contains("rate limit"))
        });

        if rate_limited {
            let rate_limit = self.fetch_rate_limit_info().await;
            RefreshError::RateLimitExceeded {
                rate_limit,
                retry_after_secs: None,
                message: format!("{operation} failed: {message}"),
            }
        } else {
            RefreshError::Api {
                message: format!("{operation} failed: {message}"),
            }
        }
    }

    async fn map_error(&self, operation: &str, error: &octocrab::Error) -> RefreshError {
        match error {
            octocrab::Error::GitHub { source, .. } if is_secondary_rate_limit(source) => {
                RefreshError::SecondaryRateLimit {
                    retry_after_secs: None,
                    message: format!("{operation} failed: {message}", message = source.message),
                }
            }
            octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
                let rate_limit = self.fetch_rate_limit_info().await;
                RefreshError::RateLimitExceeded {
                    rate_limit,
                    retry_after_secs: None,
                    message: format!("{operation} failed: {message}", message = source.message),
                }
            }
            _ => map_octocrab_error(operation, error),
        }
    }

    /// Best-effort quota snapshot from the REST rate-limit resource.
    async fn fetch_rate_limit_info(&self) -> Option<RateLimitInfo> {
        let rate = self.client.ratelimit().get().await.ok()?.rate;
        let limit = u32::try_from(rate.limit).ok()?;
        let remaining = u32::try_from(rate.remaining).ok()?;
        Some(RateLimitInfo::new(limit, remaining, rate.reset))
    }
}

/// Logs remaining-quota telemetry after a successful call.
///
/// Purely observational; absence of quota figures never fails the call.
fn log_quota(operation: &str, quota: Option<&WireQuota>) {
    let cost = quota.and_then(|q| q.cost);
    let remaining = quota.and_then(|q| q.remaining);
    tracing::debug!(
        operation,
        cost = ?cost,
        remaining = ?remaining,
        "GraphQL quota after call"
    );
}

#[async_trait]
impl GitHubGateway for OctocrabGateway {
    async fn search_pull_requests(&self, query: &str) -> Result<Vec<SearchHit>, RefreshError> {
        // The REST search path used to prepend this; kept for parity.
        let full_query = format!("is:pr {query}");

        let mut hits = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let payload = serde_json::json!({
                "query": SEARCH_QUERY,
                "variables": { "query": full_query, "cursor": cursor },
            });
            let data: SearchData = self.graphql("search pull requests", &payload).await?;
            log_quota("search pull requests", data.rate_limit.as_ref());

            let Some(connection) = data.search else {
                return Err(RefreshError::Api {
                    message: "search pull requests returned no search payload".to_owned(),
                });
            };

            hits.extend(
                connection
                    .nodes
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .filter_map(WireSearchNode::into_hit),
            );

            if !connection.page_info.has_next_page {
                break;
            }
            cursor = connection.page_info.end_cursor;
        }

        Ok(hits)
    }

    async fn load_pull_requests_bulk(
        &self,
        ids: &[PullRequestId],
    ) -> Result<Vec<RawPullRequest>, RefreshError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_values: Vec<&str> = ids.iter().map(PullRequestId::as_str).collect();
        let payload = serde_json::json!({
            "query": BULK_QUERY,
            "variables": { "ids": id_values },
        });

        let data: BulkData = self.graphql("load pull requests bulk", &payload).await?;
        log_quota("load pull requests bulk", data.rate_limit.as_ref());

        let mut records = Vec::new();
        for node in data.nodes.unwrap_or_default().into_iter().flatten() {
            if let Some(raw) = node.into_raw() {
                records.push(raw);
            } else {
                tracing::debug!("skipping malformed or inaccessible bulk node");
            }
        }

        Ok(records)
    }

    async fn pull_request_status(
        &self,
        repo: &RepoReference,
        number: u64,
    ) -> Result<PullRequestStatus, RefreshError> {
        let payload = serde_json::json!({
            "query": STATUS_QUERY,
            "variables": {
                "owner": repo.owner,
                "name": repo.name,
                "pullNumber": number,
            },
        });

        let data: StatusData = self.graphql("pull request status", &payload).await?;
        log_quota("pull request status", data.rate_limit.as_ref());

        let pull_request = data
            .repository
            .and_then(|repository| repository.pull_request)
            .ok_or_else(|| RefreshError::Api {
                message: format!(
                    "pull request status returned no record for {owner}/{name}#{number}",
                    owner = repo.owner,
                    name = repo.name
                ),
            })?;

        let check_status = pull_request
            .commits
            .map(WireConnection::into_nodes)
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|node| node.commit)
            .and_then(|commit| commit.status_check_rollup)
            .and_then(|rollup| rollup.state);

        Ok(PullRequestStatus {
            review_decision: pull_request
                .review_decision
                .unwrap_or(ReviewDecision::ReviewRequired),
            check_status,
        })
    }
}

// --- Error mapping helpers ---

const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Secondary (abuse-detection) limits come back as 403 with a distinctive
/// message rather than a dedicated status.
fn is_secondary_rate_limit(source: &octocrab::GitHubError) -> bool {
    matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) && source.message.to_lowercase().contains("secondary rate limit")
}

fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let is_rate_limit_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|doc_url| doc_url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> RefreshError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return if is_auth_failure(source.status_code) {
            RefreshError::Authentication {
                message: format!(
                    "{operation} failed: GitHub returned {status} {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        } else {
            RefreshError::Api {
                message: format!(
                    "{operation} failed with status {status}: {message}",
                    status = source.status_code,
                    message = source.message
                ),
            }
        };
    }

    if is_network_error(error) {
        return RefreshError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    RefreshError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{GitHubGateway, OctocrabGateway, PersonalAccessToken, RefreshError};
    use crate::model::{CheckStatus, PullRequestId, RepoReference, ReviewDecision};

    async fn gateway_for(server: &MockServer) -> OctocrabGateway {
        let token = PersonalAccessToken::new("valid-token").expect("token should validate");
        let api_base = url::Url::parse(&server.uri()).expect("server URI should parse");
        OctocrabGateway::for_token(&token, &api_base).expect("gateway should build")
    }

    fn search_page(
        ids: &[&str],
        has_next_page: bool,
        end_cursor: Option<&str>,
    ) -> serde_json::Value {
        let nodes: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| json!({ "__typename": "PullRequest", "id": id }))
            .collect();
        json!({
            "data": {
                "rateLimit": { "cost": 1, "remaining": 4999 },
                "search": {
                    "pageInfo": { "hasNextPage": has_next_page, "endCursor": end_cursor },
                    "nodes": nodes,
                }
            }
        })
    }

    #[tokio::test]
    async fn search_exhausts_pagination_before_returning() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "variables": { "cursor": "CURSOR_1" } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(search_page(&["PR_3"], false, None)),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "variables": { "cursor": null } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
                &["PR_1", "PR_2"],
                true,
                Some("CURSOR_1"),
            )))
            .mount(&server)
            .await;

        let hits = gateway
            .search_pull_requests("author:octocat is:open archived:false")
            .await
            .expect("search should succeed");

        let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["PR_1", "PR_2", "PR_3"], "hit order mismatch");
    }

    #[tokio::test]
    async fn search_prepends_pull_request_scope() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": { "query": "is:pr author:octocat is:open archived:false" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_page(&[], false, None)))
            .expect(1)
            .mount(&server)
            .await;

        let hits = gateway
            .search_pull_requests("author:octocat is:open archived:false")
            .await
            .expect("search should succeed");
        assert!(hits.is_empty(), "expected no hits");
    }

    #[tokio::test]
    async fn bulk_load_skips_malformed_nodes() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        let body = json!({
            "data": {
                "rateLimit": { "cost": 1, "remaining": 4998 },
                "nodes": [
                    null,
                    { "__typename": "Issue", "id": "I_1" },
                    {
                        "__typename": "PullRequest",
                        "id": "PR_1",
                        "url": "https://github.com/octo/repo/pull/1",
                        "title": "Add feature",
                        "updatedAt": "2025-06-01T10:00:00Z",
                        "number": 1,
                        "isDraft": false,
                        "mergeable": "CONFLICTING",
                        "additions": 1,
                        "deletions": 1,
                        "changedFiles": 1,
                        "author": { "login": "octocat", "avatarUrl": "https://a" },
                        "repository": { "name": "repo", "owner": { "login": "octo" } },
                        "reviewDecision": "APPROVED",
                        "reviewRequests": { "nodes": [] },
                        "reviews": { "nodes": [] },
                        "comments": { "nodes": [] },
                        "commits": { "nodes": [] }
                    }
                ]
            }
        });

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let records = gateway
            .load_pull_requests_bulk(&[PullRequestId::from("PR_1")])
            .await
            .expect("bulk load should succeed");

        assert_eq!(records.len(), 1, "only the valid node should survive");
        assert_eq!(
            records.first().map(|r| r.id.as_str()),
            Some("PR_1"),
            "unexpected surviving record"
        );
    }

    #[tokio::test]
    async fn bulk_load_with_no_ids_makes_no_calls() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let records = gateway
            .load_pull_requests_bulk(&[])
            .await
            .expect("empty bulk load should succeed");
        assert!(records.is_empty(), "expected no records");
    }

    #[tokio::test]
    async fn graphql_rate_limit_errors_map_with_quota_snapshot() {
        const EXPECTED_RESET_AT: u64 = 1_700_000_000;

        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{
                    "type": "RATE_LIMITED",
                    "message": "API rate limit exceeded for user"
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resources": {
                    "core": { "limit": 5000, "used": 5000, "remaining": 0,
                              "reset": EXPECTED_RESET_AT },
                    "search": { "limit": 30, "used": 0, "remaining": 30,
                                "reset": EXPECTED_RESET_AT }
                },
                "rate": { "limit": 5000, "used": 5000, "remaining": 0,
                          "reset": EXPECTED_RESET_AT }
            })))
            .mount(&server)
            .await;

        let error = gateway
            .search_pull_requests("author:octocat")
            .await
            .expect_err("search should fail");

        match error {
            RefreshError::RateLimitExceeded {
                rate_limit,
                message,
                ..
            } => {
                let info = rate_limit.expect("expected a quota snapshot");
                assert_eq!(info.reset_at(), EXPECTED_RESET_AT, "reset mismatch");
                assert!(
                    message.contains("API rate limit exceeded"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("expected RateLimitExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_fetch_reads_decision_and_check_state() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({
                "variables": { "owner": "octo", "name": "repo", "pullNumber": 7 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "rateLimit": { "cost": 1, "remaining": 4997 },
                    "repository": {
                        "pullRequest": {
                            "reviewDecision": "CHANGES_REQUESTED",
                            "commits": { "nodes": [
                                { "commit": { "statusCheckRollup": { "state": "FAILURE" } } }
                            ]}
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let status = gateway
            .pull_request_status(&RepoReference::new("octo", "repo"), 7)
            .await
            .expect("status fetch should succeed");

        assert_eq!(status.review_decision, ReviewDecision::ChangesRequested);
        assert_eq!(status.check_status, Some(CheckStatus::Failure));
    }
}
