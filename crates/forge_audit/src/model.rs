//! Provider-independent records returned by every [`RepositoryApi`](crate::platform::RepositoryApi)
//! implementation.
//!
//! All records are built fresh from live remote state on each call and are
//! never written back.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An account on a code forge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable handle, used as the deduplication key.
    pub login: String,
    /// Display name.
    pub username: String,
    /// Email address, empty when the provider hides it.
    pub email: String,
    pub html_url: String,
    pub node_id: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub bio: String,
    pub site_admin: bool,
    /// Provider-internal numeric ID.
    pub id: u64,
}

impl User {
    /// A user known only by login, e.g. read from a candidate list.
    #[must_use]
    pub fn from_login(login: impl Into<String>) -> Self {
        let login = login.into();
        Self {
            username: login.clone(),
            login,
            ..Self::default()
        }
    }
}

/// The subset of [`User`] needed for aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    pub username: String,
    pub email: String,
}

impl From<&User> for Contributor {
    fn from(user: &User) -> Self {
        Self {
            username: user.login.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA.
    pub id: String,
    pub message: String,
    /// Linked account, absent when the commit author has no account.
    pub author: Option<User>,
    pub date: DateTime<Utc>,
    /// Changed paths; `None` when the caller skipped the per-commit diff fetch.
    pub files: Option<Vec<String>>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub last_commit: Option<Commit>,
}

impl Branch {
    /// A branch known only by name, before its tip commit is resolved.
    #[must_use]
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_commit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Fully-qualified `owner/name`.
    pub id: String,
    pub name: String,
    pub url: String,
    pub default_branch: Branch,
    pub owner: User,
}

impl Repository {
    /// Build a repository whose `id` is derived from `owner.login` and `name`.
    #[must_use]
    pub fn new(
        owner: User,
        name: impl Into<String>,
        url: impl Into<String>,
        default_branch: Branch,
    ) -> Self {
        let name = name.into();
        Self {
            id: format!("{}/{}", owner.login, name),
            name,
            url: url.into(),
            default_branch,
            owner,
        }
    }

    /// Owner login and repository name, as used in API routes.
    #[must_use]
    pub fn owner_and_name(&self) -> (&str, &str) {
        (&self.owner.login, &self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Parse a provider state string. Anything other than `closed` is open.
    #[must_use]
    pub fn from_api(state: &str) -> Self {
        if state.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number.
    pub id: u64,
    pub title: String,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    /// Set only for closed issues.
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<User>,
    pub body: String,
    pub user: User,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number; shares a namespace with issue numbers.
    pub id: u64,
    pub title: String,
    pub author: User,
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    pub head_label: String,
    pub base_label: String,
    pub head_ref: String,
    pub base_ref: String,
    pub merged_by: Option<User>,
    pub files: Vec<String>,
    pub issue_url: Option<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: User,
}

/// A pending invitation to collaborate on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Invitation ID; `0` for invites synthesized from a collaborator diff.
    pub id: u64,
    pub invitee: User,
    pub created_at: Option<DateTime<Utc>>,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub display_title: String,
    pub event: String,
    pub head_branch: String,
    pub head_sha: String,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub run_started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub conclusion: Option<String>,
    pub status: String,
    pub url: String,
}

impl WorkflowRun {
    /// Wall time between creation and the last update.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.updated_at - self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: String,
    /// Decoded page text.
    pub content: String,
}
