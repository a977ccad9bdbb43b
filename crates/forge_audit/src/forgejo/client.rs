//! Forgejo API client and its [`RepositoryApi`] implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::convert::{
    get_user_data, synthesize_invites, to_branch, to_comment, to_commit, to_issue,
    to_pull_request, to_repository, to_wiki_page,
};
use super::error::{ForgejoError, short_error_message};
use super::types::{
    ForgejoBranch, ForgejoChangedFile, ForgejoComment, ForgejoCommit, ForgejoIssue,
    ForgejoPullRequest, ForgejoRepo, ForgejoRepoPermission, ForgejoReview, ForgejoUser,
    ForgejoWikiPage, ForgejoWikiPageMeta,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::model::{
    Branch, Comment, Commit, Contributor, Invite, Issue, PullRequest, Repository, User, WikiPage,
    WorkflowRun,
};
use crate::platform::{
    Capability, CommentTarget, Pacer, Permission, ProviderKind, RateLimitInfo, RepositoryApi,
    or_empty, permission_or_unknown,
};

/// Page size for list requests; Forgejo caps `limit` at 50 by default.
const PAGE_SIZE: usize = 50;

/// Forgejo API client.
///
/// Talks to the Gitea-compatible `/api/v1` surface of Forgejo, Gitea and
/// Codeberg. Construction does not contact the server; a bad token surfaces
/// on the first real call.
#[derive(Clone)]
pub struct ForgejoClient {
    transport: Arc<dyn HttpTransport>,
    host: String,
    token: String,
    pacer: Pacer,
}

impl ForgejoClient {
    /// Create a new Forgejo client.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use forge_audit::forgejo::ForgejoClient;
    /// use forge_audit::platform::Pacer;
    ///
    /// let client = ForgejoClient::new("https://codeberg.org", "token", Pacer::from_millis(50))?;
    /// ```
    pub fn new(host: &str, token: &str, pacer: Pacer) -> Result<Self, ForgejoError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| ForgejoError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(
            host,
            token,
            pacer,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        host: &str,
        token: &str,
        pacer: Pacer,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let host = host.trim_end_matches('/').to_string();
        Self {
            transport,
            host,
            token: token.to_string(),
            pacer,
        }
    }

    /// Get the host URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Make an authenticated GET request against `/api/v1`.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ForgejoError> {
        self.pacer.pace().await;
        let url = format!("{}/api/v1{}", self.host, path);
        tracing::trace!(url = %url, "GET");

        let request = HttpRequest::get(url).authorized(ProviderKind::Forgejo, &self.token);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ForgejoError::Http(e.to_string()))?;

        if !response.is_success() {
            return Err(ForgejoError::Api {
                status: response.status,
                message: response.text(),
            });
        }

        serde_json::from_slice(&response.body).map_err(ForgejoError::Json)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Stops at the first page holding fewer than `PAGE_SIZE` items.
    async fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ForgejoError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let items: Vec<T> = self
                .get(&format!("{path}{separator}page={page}&limit={PAGE_SIZE}"))
                .await?;
            let count = items.len();
            all.extend(items);

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    fn repo_path(repo: &Repository) -> String {
        let (owner, name) = repo.owner_and_name();
        format!("/repos/{owner}/{name}")
    }

    /// Split `owner/name` into exactly two non-empty segments.
    fn split_repository_id(id: &str) -> Result<(&str, &str), ForgejoError> {
        match id.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(ForgejoError::InvalidRepositoryId(id.to_string())),
        }
    }

    pub async fn fetch_repository(&self, id: &str) -> Result<Repository, ForgejoError> {
        let (owner, name) = Self::split_repository_id(id)?;
        let repo: ForgejoRepo = self.get(&format!("/repos/{owner}/{name}")).await?;
        Ok(to_repository(&repo))
    }

    pub async fn fetch_permission(
        &self,
        repo: &Repository,
        login: &str,
    ) -> Result<String, ForgejoError> {
        let permission: ForgejoRepoPermission = self
            .get(&format!(
                "{}/collaborators/{login}/permission",
                Self::repo_path(repo)
            ))
            .await?;
        Ok(permission.permission)
    }

    pub async fn fetch_commits(
        &self,
        repo: &Repository,
        include_files: bool,
    ) -> Result<Vec<Commit>, ForgejoError> {
        let commits: Vec<ForgejoCommit> = self
            .get_paged(&format!(
                "{}/commits?stat={include_files}&files={include_files}&verification=false",
                Self::repo_path(repo)
            ))
            .await?;
        Ok(commits
            .iter()
            .map(|c| to_commit(c, include_files))
            .collect())
    }

    /// Distinct commit authors, in order of first appearance.
    pub async fn fetch_contributors(
        &self,
        repo: &Repository,
    ) -> Result<Vec<Contributor>, ForgejoError> {
        let commits = self.fetch_commits(repo, false).await?;
        let mut seen = HashSet::new();
        Ok(commits
            .iter()
            .filter_map(|c| c.author.as_ref())
            .filter(|author| seen.insert(author.login.clone()))
            .map(Contributor::from)
            .collect())
    }

    pub async fn fetch_issues(&self, repo: &Repository) -> Result<Vec<Issue>, ForgejoError> {
        let issues: Vec<ForgejoIssue> = self
            .get_paged(&format!(
                "{}/issues?state=all&type=issues",
                Self::repo_path(repo)
            ))
            .await?;
        Ok(issues.iter().map(to_issue).collect())
    }

    pub async fn fetch_pull_requests(
        &self,
        repo: &Repository,
    ) -> Result<Vec<PullRequest>, ForgejoError> {
        let base = Self::repo_path(repo);
        let pulls: Vec<ForgejoPullRequest> =
            self.get_paged(&format!("{base}/pulls?state=all")).await?;

        let mut result = Vec::with_capacity(pulls.len());
        for pull in &pulls {
            let files = match self
                .get_paged::<ForgejoChangedFile>(&format!("{base}/pulls/{}/files", pull.number))
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
            let issue_url = format!("{}/api/v1{base}/issues/{}", self.host, pull.number);
            result.push(to_pull_request(pull, files, issue_url));
        }

        Ok(result)
    }

    pub async fn fetch_branches(&self, repo: &Repository) -> Result<Vec<Branch>, ForgejoError> {
        let branches: Vec<ForgejoBranch> = self
            .get_paged(&format!("{}/branches", Self::repo_path(repo)))
            .await?;
        Ok(branches.iter().map(to_branch).collect())
    }

    pub async fn fetch_forks(&self, repo: &Repository) -> Result<Vec<Repository>, ForgejoError> {
        let forks: Vec<ForgejoRepo> = self
            .get_paged(&format!("{}/forks", Self::repo_path(repo)))
            .await?;
        Ok(forks.iter().map(to_repository).collect())
    }

    pub async fn fetch_wiki_pages(&self, repo: &Repository) -> Result<Vec<WikiPage>, ForgejoError> {
        let base = Self::repo_path(repo);
        let pages: Vec<ForgejoWikiPageMeta> =
            self.get_paged(&format!("{base}/wiki/pages")).await?;

        let mut result = Vec::with_capacity(pages.len());
        for meta in &pages {
            let page: ForgejoWikiPage = self
                .get(&format!("{base}/wiki/page/{}", meta.sub_url))
                .await?;
            result.push(to_wiki_page(&page)?);
        }
        Ok(result)
    }

    pub async fn fetch_comments(
        &self,
        repo: &Repository,
        target: CommentTarget,
    ) -> Result<Vec<Comment>, ForgejoError> {
        let base = Self::repo_path(repo);
        let comments: Vec<ForgejoComment> = match target {
            // Not paginated: the endpoint only filters by `since`/`before`.
            CommentTarget::Issue(number) => {
                self.get(&format!("{base}/issues/{number}/comments"))
                    .await?
            }
            CommentTarget::PullRequest(number) => {
                let reviews: Vec<ForgejoReview> = self
                    .get_paged(&format!("{base}/pulls/{number}/reviews"))
                    .await?;
                let mut comments = Vec::new();
                for review in reviews.iter().filter(|r| r.comments_count > 0) {
                    let mut page: Vec<ForgejoComment> = self
                        .get(&format!(
                            "{base}/pulls/{number}/reviews/{}/comments",
                            review.id
                        ))
                        .await?;
                    comments.append(&mut page);
                }
                comments
            }
        };
        Ok(comments.iter().map(to_comment).collect())
    }

    pub async fn fetch_collaborators(&self, repo: &Repository) -> Result<Vec<User>, ForgejoError> {
        let users: Vec<ForgejoUser> = self
            .get_paged(&format!("{}/collaborators", Self::repo_path(repo)))
            .await?;
        Ok(users.iter().map(get_user_data).collect())
    }

    pub async fn fetch_invites(
        &self,
        repo: &Repository,
        candidates: &[User],
    ) -> Result<Vec<Invite>, ForgejoError> {
        let collaborators = self.fetch_collaborators(repo).await?;
        Ok(synthesize_invites(&collaborators, candidates))
    }
}

#[async_trait]
impl RepositoryApi for ForgejoClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Forgejo
    }

    fn get_base_url(&self) -> String {
        format!("{}/api/v1", self.host)
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::WikiPages)
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
        or_empty("get_wiki_pages", repo, self.fetch_wiki_pages(repo).await)
    }

    async fn get_comments(&self, repo: &Repository, target: CommentTarget) -> Vec<Comment> {
        or_empty("get_comments", repo, self.fetch_comments(repo, target).await)
    }

    async fn get_invites(&self, repo: &Repository, candidates: &[User]) -> Vec<Invite> {
        or_empty(
            "get_invites",
            repo,
            self.fetch_invites(repo, candidates).await,
        )
    }

    async fn get_rate_limiting(&self) -> RateLimitInfo {
        RateLimitInfo::unlimited()
    }

    async fn get_workflow_runs(&self, repo: &Repository) -> Vec<WorkflowRun> {
        or_empty(
            "get_workflow_runs",
            repo,
            Err(ForgejoError::Unsupported("get_workflow_runs")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use crate::model::IssueState;

    const HOST: &str = "https://forge.test";
    const API: &str = "https://forge.test/api/v1/repos/octo/widgets";

    fn client(transport: &MockTransport) -> ForgejoClient {
        ForgejoClient::new_with_transport(
            "https://forge.test/",
            "secret",
            Pacer::disabled(),
            Arc::new(transport.clone()),
        )
    }

    fn user_json(login: &str) -> serde_json::Value {
        serde_json::json!({
            "id": login.len(),
            "login": login,
            "full_name": "",
            "email": format!("{login}@noreply.forge.test"),
            "avatar_url": "https://forge.test/avatars/1",
            "html_url": format!("https://forge.test/{login}"),
            "description": "",
            "is_admin": false
        })
    }

    fn repo_json(owner: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "name": name,
            "full_name": format!("{owner}/{name}"),
            "html_url": format!("https://forge.test/{owner}/{name}"),
            "default_branch": "main",
            "private": false,
            "fork": false,
            "owner": user_json(owner)
        })
    }

    fn commit_json(sha: &str, author: &str) -> serde_json::Value {
        serde_json::json!({
            "sha": sha,
            "created": "2024-02-01T10:00:00Z",
            "commit": {
                "message": format!("commit {sha}"),
                "author": {"name": author, "email": format!("{author}@example.com"), "date": "2024-02-01T10:00:00Z"},
                "committer": {"name": author, "email": format!("{author}@example.com"), "date": "2024-02-01T10:00:00Z"}
            },
            "author": user_json(author),
            "files": [{"filename": "src/lib.rs", "status": "modified"}],
            "stats": {"total": 3, "additions": 2, "deletions": 1}
        })
    }

    fn widgets() -> Repository {
        to_repository(&serde_json::from_value(repo_json("octo", "widgets")).expect("repo json"))
    }

    #[tokio::test]
    async fn get_repository_round_trips_id_and_sends_token() {
        let transport = MockTransport::new();
        transport.push_json(API, repo_json("octo", "widgets"));

        let repo = client(&transport)
            .get_repository("octo/widgets")
            .await
            .expect("repository should resolve");

        assert_eq!(repo.id, "octo/widgets");
        assert_eq!(repo.owner.login, "octo");
        assert_eq!(repo.default_branch.name, "main");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].header_value("authorization"),
            Some("token secret")
        );
    }

    #[tokio::test]
    async fn get_repository_rejects_malformed_ids_without_a_request() {
        let transport = MockTransport::new();
        let client = client(&transport);

        for id in ["widgets", "octo/", "/widgets", "octo/widgets/extra"] {
            assert!(client.get_repository(id).await.is_none(), "{id} should fail");
        }
        assert!(transport.requests().is_empty());
        assert!(matches!(
            ForgejoClient::split_repository_id("widgets"),
            Err(ForgejoError::InvalidRepositoryId(_))
        ));
    }

    #[tokio::test]
    async fn get_repository_returns_none_on_404() {
        let transport = MockTransport::new();
        transport.push_status(API, 404, r#"{"message":"repo does not exist"}"#);

        assert!(client(&transport).get_repository("octo/widgets").await.is_none());
    }

    #[tokio::test]
    async fn get_commits_pages_until_short_page() {
        let transport = MockTransport::new();
        let first: Vec<_> = (0..PAGE_SIZE)
            .map(|i| commit_json(&format!("sha{i}"), "alice"))
            .collect();
        let base = format!("{API}/commits?stat=true&files=true&verification=false");
        transport.push_json(format!("{base}&page=1&limit=50"), serde_json::json!(first));
        transport.push_json(
            format!("{base}&page=2&limit=50"),
            serde_json::json!([commit_json("last", "bob")]),
        );

        let commits = client(&transport).get_commits(&widgets(), true).await;

        assert_eq!(commits.len(), PAGE_SIZE + 1);
        assert_eq!(commits[PAGE_SIZE].id, "last");
        assert_eq!(commits[0].files, Some(vec!["src/lib.rs".to_string()]));
        assert_eq!(commits[0].additions, Some(2));
        assert_eq!(commits[0].deletions, Some(1));
    }

    #[tokio::test]
    async fn get_commits_without_files_returns_same_ids() {
        let transport = MockTransport::new();
        let page = serde_json::json!([commit_json("a1", "alice"), commit_json("b2", "bob")]);
        transport.push_json(
            format!("{API}/commits?stat=true&files=true&verification=false&page=1&limit=50"),
            page.clone(),
        );
        transport.push_json(
            format!("{API}/commits?stat=false&files=false&verification=false&page=1&limit=50"),
            page,
        );
        let client = client(&transport);

        let with_files = client.get_commits(&widgets(), true).await;
        let without_files = client.get_commits(&widgets(), false).await;

        let ids = |commits: &[Commit]| commits.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&with_files), ids(&without_files));
        assert!(with_files.iter().all(|c| c.files.is_some()));
        assert!(without_files.iter().all(|c| c.files.is_none()));
    }

    #[tokio::test]
    async fn get_commits_soft_fails_to_empty() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{API}/commits?stat=false&files=false&verification=false&page=1&limit=50"),
            500,
            "internal error",
        );

        assert!(client(&transport).get_commits(&widgets(), false).await.is_empty());
    }

    #[tokio::test]
    async fn get_contributors_dedups_by_login_in_first_seen_order() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/commits?stat=false&files=false&verification=false&page=1&limit=50"),
            serde_json::json!([
                commit_json("1", "bob"),
                commit_json("2", "alice"),
                commit_json("3", "bob")
            ]),
        );

        let contributors = client(&transport).get_contributors(&widgets()).await;

        let logins: Vec<_> = contributors.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(logins, vec!["bob", "alice"]);
        assert_eq!(contributors[0].email, "bob@noreply.forge.test");
    }

    #[tokio::test]
    async fn get_issues_keeps_closed_at_only_for_closed_issues() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/issues?state=all&type=issues&page=1&limit=50"),
            serde_json::json!([
                {
                    "id": 901, "number": 1, "title": "open one", "state": "open",
                    "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-02T00:00:00Z",
                    "body": null, "user": user_json("alice"), "labels": [{"name": "bug"}],
                    "milestone": {"title": "v1"}
                },
                {
                    "id": 902, "number": 2, "title": "closed one", "state": "closed",
                    "created_at": "2024-01-01T00:00:00Z", "closed_at": "2024-01-03T00:00:00Z",
                    "body": "done", "user": user_json("bob"), "labels": [], "milestone": null
                }
            ]),
        );

        let issues = client(&transport).get_issues(&widgets()).await;

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, 1);
        assert_eq!(issues[0].state, IssueState::Open);
        assert!(issues[0].closed_at.is_none());
        assert_eq!(issues[0].labels, vec!["bug".to_string()]);
        assert_eq!(issues[0].milestone.as_deref(), Some("v1"));
        assert_eq!(issues[0].body, "");
        assert_eq!(issues[1].state, IssueState::Closed);
        assert!(issues[1].closed_at.is_some());
        assert!(issues[1].closed_by.is_none());
    }

    fn pull_json(number: u64) -> serde_json::Value {
        serde_json::json!({
            "number": number,
            "title": format!("pr {number}"),
            "user": user_json("alice"),
            "state": "closed",
            "created_at": "2024-01-01T00:00:00Z",
            "head": {"label": "alice:feature", "ref": "feature", "sha": "h"},
            "base": {"label": "octo:main", "ref": "main", "sha": "b"},
            "merged_by": user_json("octo"),
            "labels": [],
            "milestone": null
        })
    }

    #[tokio::test]
    async fn get_pull_requests_fetches_files_and_builds_issue_url() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/pulls?state=all&page=1&limit=50"),
            serde_json::json!([pull_json(3), pull_json(4)]),
        );
        transport.push_json(
            format!("{API}/pulls/3/files?page=1&limit=50"),
            serde_json::json!([{"filename": "README.md", "status": "changed"}]),
        );
        transport.push_status(format!("{API}/pulls/4/files?page=1&limit=50"), 404, "not found");

        let pulls = client(&transport).get_pull_requests(&widgets()).await;

        assert_eq!(pulls.len(), 2);
        assert_eq!(pulls[0].files, vec!["README.md".to_string()]);
        assert_eq!(pulls[0].head_label, "alice:feature");
        assert_eq!(pulls[0].head_ref, "feature");
        assert_eq!(pulls[0].base_ref, "main");
        assert_eq!(pulls[0].merged_by.as_ref().map(|u| u.login.as_str()), Some("octo"));
        assert_eq!(
            pulls[0].issue_url.as_deref(),
            Some("https://forge.test/api/v1/repos/octo/widgets/issues/3")
        );
        assert!(pulls[1].files.is_empty());
    }

    #[tokio::test]
    async fn get_branches_maps_tip_commit_from_payload() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/branches?page=1&limit=50"),
            serde_json::json!([{
                "name": "main",
                "commit": {
                    "id": "abc",
                    "message": "tip",
                    "author": {"name": "Alice", "email": "alice@example.com", "username": "alice"},
                    "timestamp": "2024-04-01T08:00:00Z"
                },
                "protected": false
            }]),
        );

        let branches = client(&transport).get_branches(&widgets()).await;

        assert_eq!(branches.len(), 1);
        let tip = branches[0].last_commit.as_ref().expect("tip commit");
        assert_eq!(tip.id, "abc");
        assert!(tip.files.is_none());
        let author = tip.author.as_ref().expect("author");
        assert_eq!(author.login, "alice");
        assert_eq!(author.username, "Alice");
    }

    #[tokio::test]
    async fn get_wiki_pages_decodes_each_page() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/wiki/pages?page=1&limit=50"),
            serde_json::json!([{"title": "Home", "sub_url": "Home"}]),
        );
        transport.push_json(
            format!("{API}/wiki/page/Home"),
            serde_json::json!({"title": "Home", "content_base64": "IyBXZWxjb21lCg=="}),
        );

        let pages = client(&transport).get_wiki_pages(&widgets()).await;

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "# Welcome\n");
    }

    #[tokio::test]
    async fn get_comments_dispatches_by_target() {
        let comment = |body: &str| {
            serde_json::json!({"body": body, "created_at": "2024-01-01T00:00:00Z", "user": user_json("alice")})
        };
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/issues/5/comments"),
            serde_json::json!([comment("on issue")]),
        );
        transport.push_json(
            format!("{API}/pulls/6/reviews?page=1&limit=50"),
            serde_json::json!([{"id": 11, "comments_count": 1}, {"id": 12, "comments_count": 0}]),
        );
        transport.push_json(
            format!("{API}/pulls/6/reviews/11/comments"),
            serde_json::json!([comment("on review")]),
        );
        let client = client(&transport);

        let issue_comments = client
            .get_comments(&widgets(), CommentTarget::Issue(5))
            .await;
        let pull_comments = client
            .get_comments(&widgets(), CommentTarget::PullRequest(6))
            .await;

        assert_eq!(issue_comments.len(), 1);
        assert_eq!(issue_comments[0].body, "on issue");
        assert_eq!(pull_comments.len(), 1);
        assert_eq!(pull_comments[0].body, "on review");
        assert_eq!(pull_comments[0].author.login, "alice");

        let urls = transport.requested_urls();
        assert_eq!(urls[0], format!("{API}/issues/5/comments"));
        assert!(urls[1..].iter().all(|u| u.contains("/pulls/6/")));
    }

    #[tokio::test]
    async fn issue_comments_are_read_in_one_request() {
        let comments: Vec<serde_json::Value> = (0..60)
            .map(|i| {
                serde_json::json!({
                    "body": format!("comment {i}"),
                    "created_at": "2024-01-01T00:00:00Z",
                    "user": user_json("alice")
                })
            })
            .collect();
        let transport = MockTransport::new();
        // A second response would be served if the client asked again.
        for _ in 0..2 {
            transport.push_json(
                format!("{API}/issues/5/comments"),
                serde_json::Value::Array(comments.clone()),
            );
        }

        let fetched = client(&transport)
            .get_comments(&widgets(), CommentTarget::Issue(5))
            .await;

        assert_eq!(fetched.len(), 60);
        assert_eq!(fetched[59].body, "comment 59");
        assert_eq!(transport.requested_urls().len(), 1);
    }

    #[tokio::test]
    async fn get_invites_reports_candidates_missing_from_collaborators() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/collaborators?page=1&limit=50"),
            serde_json::json!([user_json("alice")]),
        );
        let candidates = vec![User::from_login("alice"), User::from_login("bob")];

        let invites = client(&transport)
            .get_invites(&widgets(), &candidates)
            .await;

        assert_eq!(invites.len(), 1);
        assert_eq!(invites[0].invitee.login, "bob");
        assert!(invites[0].created_at.is_none());
    }

    #[tokio::test]
    async fn get_collaborator_permission_maps_status() {
        let transport = MockTransport::new();
        let url = format!("{API}/collaborators/alice/permission");
        transport.push_json(
            url.clone(),
            serde_json::json!({"permission": "write", "role_name": "write", "user": user_json("alice")}),
        );
        transport.push_status(url.clone(), 403, "forbidden");
        transport.push_status(url, 500, "boom");
        let client = client(&transport);
        let alice = User::from_login("alice");

        assert_eq!(
            client.get_collaborator_permission(&widgets(), &alice).await,
            Permission::Granted("write".to_string())
        );
        assert_eq!(
            client.get_collaborator_permission(&widgets(), &alice).await,
            Permission::Denied
        );
        assert!(matches!(
            client.get_collaborator_permission(&widgets(), &alice).await,
            Permission::Unknown(_)
        ));
    }

    #[tokio::test]
    async fn fetch_collaborators_maps_users() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/collaborators?page=1&limit=50"),
            serde_json::json!([user_json("alice"), user_json("bob")]),
        );

        let users = client(&transport)
            .fetch_collaborators(&widgets())
            .await
            .expect("collaborators");
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].html_url, "https://forge.test/bob");
    }

    #[tokio::test]
    async fn forks_are_mapped_to_repositories() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/forks?page=1&limit=50"),
            serde_json::json!([repo_json("bob", "widgets")]),
        );

        let forks = client(&transport).get_forks(&widgets()).await;
        assert_eq!(forks.len(), 1);
        assert_eq!(forks[0].id, "bob/widgets");
    }

    #[tokio::test]
    async fn unsupported_and_unmetered_operations() {
        let transport = MockTransport::new();
        let client = client(&transport);

        assert_eq!(client.get_rate_limiting().await, RateLimitInfo::unlimited());
        assert!(client.get_workflow_runs(&widgets()).await.is_empty());
        assert!(transport.requests().is_empty());
        assert_eq!(client.get_base_url(), format!("{HOST}/api/v1"));
        assert_eq!(client.host(), HOST);
        assert_eq!(client.provider(), ProviderKind::Forgejo);
        assert!(client.supports(Capability::WikiPages));
        assert!(!client.supports(Capability::WorkflowRuns));
        assert!(!client.supports(Capability::Invites));
    }
}
