//! Forgejo API data types.
//!
//! Only the fields the adapter maps are declared, which keeps deserialization
//! resilient to additions across Forgejo and Gitea versions.
//!
//! API docs: https://codeberg.org/api/swagger

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Forgejo user account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgejoUser {
    pub id: u64,
    pub login: String,
    /// Display name, often empty.
    pub full_name: String,
    pub email: String,
    pub html_url: String,
    /// Profile bio.
    pub description: String,
    pub is_admin: bool,
}

/// Forgejo repository.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoRepo {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    pub owner: ForgejoUser,
}

/// Git identity recorded in a commit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgejoCommitIdentity {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoRepoCommit {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<ForgejoCommitIdentity>,
    #[serde(default)]
    pub committer: Option<ForgejoCommitIdentity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoCommitFile {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoCommit {
    pub sha: String,
    pub commit: ForgejoRepoCommit,
    /// Linked account of the git author.
    #[serde(default)]
    pub author: Option<ForgejoUser>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: Option<Vec<ForgejoCommitFile>>,
    #[serde(default)]
    pub stats: Option<ForgejoCommitStats>,
}

/// Commit identity as embedded in a branch payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgejoPayloadUser {
    pub name: String,
    pub email: String,
    pub username: String,
}

/// Tip commit embedded in a branch payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoPayloadCommit {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<ForgejoPayloadUser>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoBranch {
    pub name: String,
    #[serde(default)]
    pub commit: Option<ForgejoPayloadCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoMilestone {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
    pub user: ForgejoUser,
    #[serde(default)]
    pub labels: Vec<ForgejoLabel>,
    #[serde(default)]
    pub milestone: Option<ForgejoMilestone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoPrBranch {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "ref", default)]
    pub ref_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoPullRequest {
    pub number: u64,
    pub title: String,
    pub user: ForgejoUser,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub head: ForgejoPrBranch,
    pub base: ForgejoPrBranch,
    #[serde(default)]
    pub merged_by: Option<ForgejoUser>,
    #[serde(default)]
    pub labels: Vec<ForgejoLabel>,
    #[serde(default)]
    pub milestone: Option<ForgejoMilestone>,
}

/// Entry of `GET /repos/{owner}/{repo}/pulls/{index}/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoChangedFile {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoComment {
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<ForgejoUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoReview {
    pub id: u64,
    #[serde(default)]
    pub comments_count: u64,
}

/// Entry of `GET /repos/{owner}/{repo}/wiki/pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoWikiPageMeta {
    /// URL-escaped page name used in page routes.
    pub sub_url: String,
}

/// `GET /repos/{owner}/{repo}/wiki/page/{pageName}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoWikiPage {
    pub title: String,
    #[serde(default)]
    pub content_base64: String,
}

/// `GET /repos/{owner}/{repo}/collaborators/{collaborator}/permission`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgejoRepoPermission {
    pub permission: String,
}
