//! GitHub REST API data types.
//!
//! Only the fields the adapter maps are declared. Nullable fields are
//! `Option` and list payloads that omit them deserialize with defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single rate limit resource entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResource {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Requests used in current period.
    #[serde(default)]
    pub used: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
}

impl RateLimitResource {
    /// Get the reset time as a DateTime.
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset as i64, 0).unwrap_or_else(Utc::now)
    }
}

/// Rate limit resources the adapter reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimits {
    /// Core API rate limit (non-search REST endpoints).
    pub core: RateLimitResource,
}

/// `GET /rate_limit` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRateLimitResponse {
    pub resources: GitHubRateLimits,
}

/// GitHub account, either a full profile or the simple form embedded in lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub site_admin: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    pub owner: GitHubUser,
}

/// Git identity recorded in a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubGitIdentity {
    #[serde(default)]
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubGitCommit {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GitHubGitIdentity>,
    #[serde(default)]
    pub committer: Option<GitHubGitIdentity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitFile {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Commit as returned by the list endpoint (no `files`/`stats`) or the
/// single-commit endpoint (with both).
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub commit: GitHubGitCommit,
    #[serde(default)]
    pub author: Option<GitHubUser>,
    #[serde(default)]
    pub files: Option<Vec<GitHubCommitFile>>,
    #[serde(default)]
    pub stats: Option<GitHubCommitStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranch {
    pub name: String,
    pub commit: GitHubCommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubMilestone {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Only present on the single-issue endpoint.
    #[serde(default)]
    pub closed_by: Option<GitHubUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub user: GitHubUser,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
    /// Set when the entry is a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPrRef {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequest {
    pub number: u64,
    pub title: String,
    pub user: GitHubUser,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub head: GitHubPrRef,
    pub base: GitHubPrRef,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Only present on the single pull request endpoint.
    #[serde(default)]
    pub merged_by: Option<GitHubUser>,
    #[serde(default)]
    pub issue_url: Option<String>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    #[serde(default)]
    pub milestone: Option<GitHubMilestone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullFile {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubInvitation {
    pub id: u64,
    #[serde(default)]
    pub invitee: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

/// `GET /repos/{owner}/{repo}/collaborators/{username}/permission`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPermission {
    pub permission: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflowRun {
    #[serde(default)]
    pub display_title: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head_sha: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub url: String,
}

/// `GET /repos/{owner}/{repo}/actions/runs` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflowRuns {
    pub total_count: usize,
    #[serde(default)]
    pub workflow_runs: Vec<GitHubWorkflowRun>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_response_deserialize() {
        let json = r#"{
            "resources": {
                "core": {"limit": 5000, "used": 100, "remaining": 4900, "reset": 1700000000},
                "search": {"limit": 30, "used": 0, "remaining": 30, "reset": 1700000000}
            },
            "rate": {"limit": 5000, "used": 100, "remaining": 4900, "reset": 1700000000}
        }"#;

        let response: GitHubRateLimitResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.resources.core.limit, 5000);
        assert_eq!(response.resources.core.remaining, 4900);
        assert_eq!(
            response.resources.core.reset_at().timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn test_simple_user_deserializes_without_profile_fields() {
        let json = r#"{"login": "octocat", "id": 1, "node_id": "MDQ6VXNlcjE=",
            "html_url": "https://github.com/octocat", "type": "User", "site_admin": false}"#;

        let user: GitHubUser = serde_json::from_str(json).unwrap();

        assert_eq!(user.login, "octocat");
        assert_eq!(user.user_type, "User");
        assert!(user.name.is_none());
        assert!(user.email.is_none());
    }

    #[test]
    fn test_issue_marks_pull_requests() {
        let json = r#"{"number": 3, "title": "t", "state": "open",
            "created_at": "2024-01-01T00:00:00Z", "user": {"login": "a"},
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/3"}}"#;

        let issue: GitHubIssue = serde_json::from_str(json).unwrap();

        assert!(issue.pull_request.is_some());
        assert!(issue.labels.is_empty());
    }
}
