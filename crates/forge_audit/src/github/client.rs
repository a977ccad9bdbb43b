//! GitHub API client and its [`RepositoryApi`] implementation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;

use super::convert::{
    get_user_data, to_comment, to_commit, to_invite, to_issue, to_pull_request, to_repository,
    to_workflow_run,
};
use super::error::{GitHubError, short_error_message, status_code};
use super::types::{
    GitHubBranch, GitHubComment, GitHubCommit, GitHubInvitation, GitHubIssue, GitHubPermission,
    GitHubPullFile, GitHubPullRequest, GitHubRateLimitResponse, GitHubRepo, GitHubUser,
    GitHubWorkflowRuns,
};
use crate::model::{
    Branch, Comment, Commit, Contributor, Invite, Issue, PullRequest, Repository, User, WikiPage,
    WorkflowRun,
};
use crate::platform::{
    Capability, CommentTarget, Pacer, Permission, ProviderKind, RateLimitInfo, RepositoryApi,
    or_empty, permission_or_unknown,
};

/// Public GitHub REST API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Page size for list requests (GitHub maximum).
const PAGE_SIZE: usize = 100;

/// Create an authenticated Octocrab instance from a GitHub token.
///
/// `base_url` points the client at a GitHub Enterprise API root instead of
/// the public API.
pub fn create_client(token: &str, base_url: Option<&str>) -> Result<Octocrab, GitHubError> {
    let mut builder = Octocrab::builder();
    if let Some(url) = base_url {
        builder = builder.base_uri(url)?;
    }
    builder
        .personal_token(token.to_string())
        .build()
        .map_err(GitHubError::Api)
}

/// Get current rate limit status (core API only).
pub async fn get_rate_limit(client: &Octocrab) -> Result<RateLimitInfo, GitHubError> {
    let response: GitHubRateLimitResponse = client.get("/rate_limit", None::<&()>).await?;
    let core = &response.resources.core;

    Ok(RateLimitInfo {
        limit: core.limit,
        remaining: core.remaining,
        reset_at: Some(core.reset_at()),
    })
}

/// GitHub API client.
///
/// Built with [`GitHubClient::connect`], which rejects tokens that cannot
/// fetch the authenticated user, so a pooled client is always usable.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
    base_url: String,
    login: String,
    pacer: Pacer,
}

impl GitHubClient {
    /// Build a client and validate the token with `GET /user`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use forge_audit::github::GitHubClient;
    /// use forge_audit::platform::Pacer;
    ///
    /// let client = GitHubClient::connect(&token, None, Pacer::from_millis(50)).await?;
    /// println!("authenticated as {}", client.login());
    /// ```
    pub async fn connect(
        token: &str,
        base_url: Option<&str>,
        pacer: Pacer,
    ) -> Result<Self, GitHubError> {
        let inner = create_client(token, base_url)?;

        let user: GitHubUser = inner.get("/user", None::<&()>).await.map_err(|e| {
            tracing::debug!(status = ?status_code(&e), "GitHub token validation failed");
            GitHubError::Auth(short_error_message(&e))
        })?;

        tracing::debug!(login = %user.login, "Authenticated with GitHub");

        Ok(Self {
            inner: Arc::new(inner),
            base_url: base_url
                .unwrap_or(GITHUB_API_URL)
                .trim_end_matches('/')
                .to_string(),
            login: user.login,
            pacer,
        })
    }

    /// Get a reference to the underlying Octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }

    /// Login of the account the token belongs to.
    pub fn login(&self) -> &str {
        &self.login
    }

    async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T, GitHubError> {
        self.pacer.pace().await;
        Ok(self.inner.get(route, None::<&()>).await?)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Stops at the first page holding fewer than `PAGE_SIZE` items.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        route: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, GitHubError> {
        let mut all = Vec::new();
        let mut page = 1usize;

        loop {
            self.pacer.pace().await;
            let mut query: Vec<(&str, String)> =
                params.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
            query.push(("per_page", PAGE_SIZE.to_string()));
            query.push(("page", page.to_string()));

            let items: Vec<T> = self.inner.get(route, Some(&query)).await?;
            let count = items.len();
            all.extend(items);

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    fn repo_route(repo: &Repository) -> String {
        let (owner, name) = repo.owner_and_name();
        format!("/repos/{owner}/{name}")
    }

    pub async fn fetch_repository(&self, id: &str) -> Result<Repository, GitHubError> {
        let (owner, name) = match id.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                (owner, name)
            }
            _ => return Err(GitHubError::InvalidRepositoryId(id.to_string())),
        };
        let repo: GitHubRepo = self.get(&format!("/repos/{owner}/{name}")).await?;
        Ok(to_repository(&repo))
    }

    pub async fn fetch_permission(
        &self,
        repo: &Repository,
        login: &str,
    ) -> Result<String, GitHubError> {
        let permission: GitHubPermission = self
            .get(&format!(
                "{}/collaborators/{login}/permission",
                Self::repo_route(repo)
            ))
            .await?;
        Ok(permission.permission)
    }

    /// Single-commit payload, which carries `files` and `stats`.
    async fn fetch_commit_detail(
        &self,
        repo: &Repository,
        sha: &str,
    ) -> Result<GitHubCommit, GitHubError> {
        self.get(&format!("{}/commits/{sha}", Self::repo_route(repo)))
            .await
    }

    pub async fn fetch_commits(
        &self,
        repo: &Repository,
        include_files: bool,
    ) -> Result<Vec<Commit>, GitHubError> {
        let summaries: Vec<GitHubCommit> = self
            .get_paged(&format!("{}/commits", Self::repo_route(repo)), &[])
            .await?;

        if !include_files {
            return Ok(summaries.iter().map(|c| to_commit(c, false)).collect());
        }

        let mut commits = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            match self.fetch_commit_detail(repo, &summary.sha).await {
                Ok(detail) => commits.push(to_commit(&detail, true)),
                Err(e) => {
                    tracing::warn!(
                        repository = %repo.id,
                        sha = %summary.sha,
                        error = %short_error_message(&e),
                        "Could not fetch commit detail, keeping summary"
                    );
                    commits.push(to_commit(summary, false));
                }
            }
        }
        Ok(commits)
    }

    pub async fn fetch_contributors(
        &self,
        repo: &Repository,
    ) -> Result<Vec<Contributor>, GitHubError> {
        let users: Vec<GitHubUser> = self
            .get_paged(&format!("{}/contributors", Self::repo_route(repo)), &[])
            .await?;
        let mut seen = HashSet::new();
        Ok(users
            .iter()
            .filter(|u| !u.login.is_empty() && seen.insert(u.login.clone()))
            .map(|u| Contributor::from(&get_user_data(u)))
            .collect())
    }

    /// Issues in every state. The issues endpoint also lists pull requests;
    /// those entries are dropped.
    pub async fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>, GitHubError> {
        let issues: Vec<GitHubIssue> = self
            .get_paged(
                &format!("{}/issues", Self::repo_route(repo)),
                &[("state", "all")],
            )
            .await?;

        let mut result = Vec::with_capacity(issues.len());
        for issue in issues.iter().filter(|i| i.pull_request.is_none()) {
            let closed_by = if issue.state == "closed" && issue.closed_by.is_none() {
                self.fetch_closed_by(repo, issue.number).await
            } else {
                None
            };
            result.push(to_issue(issue, closed_by));
        }
        Ok(result)
    }

    /// Only the single-issue payload names who closed it.
    async fn fetch_closed_by(&self, repo: &Repository, number: u64) -> Option<User> {
        match self
            .get::<GitHubIssue>(&format!("{}/issues/{number}", Self::repo_route(repo)))
            .await
        {
            Ok(detail) => detail.closed_by.as_ref().map(get_user_data),
            Err(e) => {
                tracing::warn!(
                    repository = %repo.id,
                    issue = number,
                    error = %short_error_message(&e),
                    "Could not fetch issue detail"
                );
                None
            }
        }
    }

    pub async fn fetch_pull_requests(
        &self,
        repo: &Repository,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let route = Self::repo_route(repo);
        let pulls: Vec<GitHubPullRequest> = self
            .get_paged(&format!("{route}/pulls"), &[("state", "all")])
            .await?;

        let mut result = Vec::with_capacity(pulls.len());
        for pull in &pulls {
            let files = match self
                .get_paged::<GitHubPullFile>(&format!("{route}/pulls/{}/files", pull.number), &[])
                .await
            {
                Ok(files) => files.into_iter().map(|f| f.filename).collect(),
                Err(e) => {
                    tracing::warn!(
                        repository = %repo.id,
                        pull = pull.number,
                        error = %short_error_message(&e),
                        "Could not list pull request files"
                    );
                    Vec::new()
                }
            };

            // The list payload never names the merger.
            let merged_by = if pull.merged_at.is_some() && pull.merged_by.is_none() {
                match self
                    .get::<GitHubPullRequest>(&format!("{route}/pulls/{}", pull.number))
                    .await
                {
                    Ok(detail) => detail.merged_by.as_ref().map(get_user_data),
                    Err(e) => {
                        tracing::warn!(
                            repository = %repo.id,
                            pull = pull.number,
                            error = %short_error_message(&e),
                            "Could not fetch pull request detail"
                        );
                        None
                    }
                }
            } else {
                None
            };

            result.push(to_pull_request(pull, merged_by, files));
        }

        Ok(result)
    }

    /// Branches with their tip commit, one extra request per branch.
    pub async fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>, GitHubError> {
        let branches: Vec<GitHubBranch> = self
            .get_paged(&format!("{}/branches", Self::repo_route(repo)), &[])
            .await?;

        let mut result = Vec::with_capacity(branches.len());
        for branch in &branches {
            let last_commit = match self.fetch_commit_detail(repo, &branch.commit.sha).await {
                Ok(detail) => Some(to_commit(&detail, true)),
                Err(e) => {
                    tracing::warn!(
                        repository = %repo.id,
                        branch = %branch.name,
                        error = %short_error_message(&e),
                        "Could not resolve branch tip"
                    );
                    None
                }
            };
            result.push(Branch {
                name: branch.name.clone(),
                last_commit,
            });
        }
        Ok(result)
    }

    pub async fn fetch_forks(&self, repo: &Repository) -> Result<Vec<Repository>, GitHubError> {
        let forks: Vec<GitHubRepo> = self
            .get_paged(&format!("{}/forks", Self::repo_route(repo)), &[])
            .await?;
        Ok(forks.iter().map(to_repository).collect())
    }

    pub async fn fetch_comments(
        &self,
        repo: &Repository,
        target: CommentTarget,
    ) -> Result<Vec<Comment>, GitHubError> {
        let route = match target {
            CommentTarget::Issue(number) => {
                format!("{}/issues/{number}/comments", Self::repo_route(repo))
            }
            CommentTarget::PullRequest(number) => {
                format!("{}/pulls/{number}/comments", Self::repo_route(repo))
            }
        };
        let comments: Vec<GitHubComment> = self.get_paged(&route, &[]).await?;
        Ok(comments.iter().map(to_comment).collect())
    }

    pub async fn fetch_invites(&self, repo: &Repository) -> Result<Vec<Invite>, GitHubError> {
        let invitations: Vec<GitHubInvitation> = self
            .get_paged(&format!("{}/invitations", Self::repo_route(repo)), &[])
            .await?;
        Ok(invitations.iter().map(to_invite).collect())
    }

    pub async fn fetch_workflow_runs(
        &self,
        repo: &Repository,
    ) -> Result<Vec<WorkflowRun>, GitHubError> {
        let route = format!("{}/actions/runs", Self::repo_route(repo));
        let mut runs = Vec::new();
        let mut page = 1usize;

        loop {
            self.pacer.pace().await;
            let query = vec![
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let envelope: GitHubWorkflowRuns = self.inner.get(&route, Some(&query)).await?;
            let count = envelope.workflow_runs.len();
            runs.extend(envelope.workflow_runs.iter().map(to_workflow_run));

            if count == 0 || runs.len() >= envelope.total_count {
                break;
            }
            page += 1;
        }

        Ok(runs)
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::WikiPages => false,
            Capability::WorkflowRuns | Capability::Invites => true,
        }
    }

    async fn get_repository(&self, id: &str) -> Option<Repository> {
        match self.fetch_repository(id).await {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!(
                    repository = id,
                    error = %short_error_message(&e),
                    "Failed to resolve repository"
                );
                None
            }
        }
    }

    async fn get_collaborator_permission(&self, repo: &Repository, user: &User) -> Permission {
        permission_or_unknown(
            repo,
            &user.login,
            self.fetch_permission(repo, &user.login).await,
        )
    }

    async fn get_commits(&self, repo: &Repository, include_files: bool) -> Vec<Commit> {
        or_empty(
            "get_commits",
            repo,
            self.fetch_commits(repo, include_files).await,
        )
    }

    async fn get_contributors(&self, repo: &Repository) -> Vec<Contributor> {
        or_empty("get_contributors", repo, self.fetch_contributors(repo).await)
    }

    async fn get_issues(&self, repo: &Repository) -> Vec<Issue> {
        or_empty("get_issues", repo, self.fetch_issues(repo).await)
    }

    async fn get_pull_requests(&self, repo: &Repository) -> Vec<PullRequest> {
        or_empty(
            "get_pull_requests",
            repo,
            self.fetch_pull_requests(repo).await,
        )
    }

    async fn get_branches(&self, repo: &Repository) -> Vec<Branch> {
        or_empty("get_branches", repo, self.fetch_branches(repo).await)
    }

    async fn get_forks(&self, repo: &Repository) -> Vec<Repository> {
        or_empty("get_forks", repo, self.fetch_forks(repo).await)
    }

    async fn get_wiki_pages(&self, repo: &Repository) -> Vec<WikiPage> {
        or_empty(
            "get_wiki_pages",
            repo,
            Err(GitHubError::Unsupported("get_wiki_pages")),
        )
    }

    async fn get_comments(&self, repo: &Repository, target: CommentTarget) -> Vec<Comment> {
        or_empty("get_comments", repo, self.fetch_comments(repo, target).await)
    }

    async fn get_invites(&self, repo: &Repository, _candidates: &[User]) -> Vec<Invite> {
        or_empty("get_invites", repo, self.fetch_invites(repo).await)
    }

    async fn get_rate_limiting(&self) -> RateLimitInfo {
        match get_rate_limit(&self.inner).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(
                    login = %self.login,
                    error = %short_error_message(&e),
                    "Could not read rate limit, treating quota as exhausted"
                );
                RateLimitInfo::unknown()
            }
        }
    }

    async fn get_workflow_runs(&self, repo: &Repository) -> Vec<WorkflowRun> {
        or_empty(
            "get_workflow_runs",
            repo,
            self.fetch_workflow_runs(repo).await,
        )
    }
}
