use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    Branch, Comment, Commit, Contributor, Invite, Issue, PullRequest, Repository, User, WikiPage,
    WorkflowRun,
};

/// Supported forge providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(alias = "gh")]
    GitHub,
    #[serde(alias = "gitea")]
    Forgejo,
}

impl ProviderKind {
    /// Pick a provider from the presence of a base URL.
    ///
    /// Only used when the caller did not name a provider explicitly.
    #[must_use]
    pub fn infer(base_url: Option<&str>) -> Self {
        match base_url {
            Some(url) if !url.trim().is_empty() => Self::Forgejo,
            _ => Self::GitHub,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::Forgejo => write!(f, "forgejo"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" | "gh" => Ok(Self::GitHub),
            "forgejo" | "gitea" => Ok(Self::Forgejo),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// Quota reported by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed per period.
    pub limit: usize,
    /// Remaining requests in current period.
    pub remaining: usize,
    /// When the quota resets, if the provider reports it.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    /// Quota for providers that do not meter API usage.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            limit: usize::MAX,
            remaining: usize::MAX,
            reset_at: None,
        }
    }

    /// Quota reported when the provider could not be asked.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            limit: 0,
            remaining: 0,
            reset_at: None,
        }
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.remaining == usize::MAX
    }
}

/// Result of a collaborator permission lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Permission {
    /// The user holds this permission level (`admin`, `write`, `read`, ...).
    Granted(String),
    /// The token is not allowed to read the permission.
    Denied,
    /// The lookup failed for another reason.
    Unknown(String),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted(level) => write!(f, "{level}"),
            Self::Denied => write!(f, "denied"),
            Self::Unknown(_) => write!(f, "unknown"),
        }
    }
}

/// What a comment thread is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentTarget {
    Issue(u64),
    PullRequest(u64),
}

impl From<&Issue> for CommentTarget {
    fn from(issue: &Issue) -> Self {
        Self::Issue(issue.id)
    }
}

impl From<&PullRequest> for CommentTarget {
    fn from(pull: &PullRequest) -> Self {
        Self::PullRequest(pull.id)
    }
}

/// Optional operations a provider may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    WikiPages,
    WorkflowRuns,
    /// Real pending invitations, as opposed to a collaborator diff.
    Invites,
}

/// Read-only access to one forge account's view of its repositories.
///
/// Every list operation swallows failures: the cause is logged with the
/// operation and repository, and an empty list is returned so one broken
/// resource never stops an export run.
///
/// Implementations must be object safe; pools hold `Arc<dyn RepositoryApi>`.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// The provider this client talks to.
    fn provider(&self) -> ProviderKind;

    /// Root of the REST API, for callers issuing raw requests.
    fn get_base_url(&self) -> String;

    /// Whether the provider backs `capability` with a real API.
    fn supports(&self, capability: Capability) -> bool;

    /// Resolve `owner/name`. Returns `None` (after logging) on any failure.
    async fn get_repository(&self, id: &str) -> Option<Repository>;

    async fn get_collaborator_permission(&self, repo: &Repository, user: &User) -> Permission;

    /// Commit history of the default branch.
    ///
    /// With `include_files == false` the per-commit diff is not fetched, so
    /// `files` is `None`.
    async fn get_commits(&self, repo: &Repository, include_files: bool) -> Vec<Commit>;

    /// Distinct contributors, deduplicated by login.
    async fn get_contributors(&self, repo: &Repository) -> Vec<Contributor>;

    /// Issues in every state.
    async fn get_issues(&self, repo: &Repository) -> Vec<Issue>;

    /// Pull requests in every state.
    async fn get_pull_requests(&self, repo: &Repository) -> Vec<PullRequest>;

    /// Branches, each with its tip commit resolved.
    async fn get_branches(&self, repo: &Repository) -> Vec<Branch>;

    async fn get_forks(&self, repo: &Repository) -> Vec<Repository>;

    async fn get_wiki_pages(&self, repo: &Repository) -> Vec<WikiPage>;

    async fn get_comments(&self, repo: &Repository, target: CommentTarget) -> Vec<Comment>;

    /// Pending invitations. Providers without an invitation API report the
    /// `candidates` who are not yet collaborators.
    async fn get_invites(&self, repo: &Repository, candidates: &[User]) -> Vec<Invite>;

    async fn get_rate_limiting(&self) -> RateLimitInfo;

    async fn get_workflow_runs(&self, repo: &Repository) -> Vec<WorkflowRun>;
}
