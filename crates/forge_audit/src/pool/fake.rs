//! In-memory clients for pool and binding tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::ClientFactory;
use crate::model::{
    Branch, Comment, Commit, Contributor, Invite, Issue, PullRequest, Repository, User, WikiPage,
    WorkflowRun,
};
use crate::platform::{
    Capability, CommentTarget, Permission, PlatformError, ProviderKind, RateLimitInfo,
    RepositoryApi,
};

/// Client whose quota lives in an atomic and drops by one per call.
pub struct FakeApi {
    remaining: AtomicUsize,
    unresolvable: HashSet<String>,
}

impl FakeApi {
    /// Quota consumed by one `get_commits` call.
    pub const COMMITS_COST: usize = 10;

    pub fn new(remaining: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(remaining),
            unresolvable: HashSet::new(),
        }
    }

    /// Make `get_repository` return `None` for `id`.
    pub fn failing_on(mut self, id: &str) -> Self {
        self.unresolvable.insert(id.to_string());
        self
    }

    pub fn consume(&self, calls: usize) {
        let _ = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| {
                Some(r.saturating_sub(calls))
            });
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryApi for FakeApi {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn get_base_url(&self) -> String {
        "https://fake.test".to_string()
    }

    fn supports(&self, _capability: Capability) -> bool {
        false
    }

    async fn get_repository(&self, id: &str) -> Option<Repository> {
        self.consume(1);
        if self.unresolvable.contains(id) {
            return None;
        }
        let (owner, name) = id.split_once('/')?;
        Some(Repository::new(
            User::from_login(owner),
            name,
            format!("https://fake.test/{id}"),
            Branch::unresolved("main"),
        ))
    }

    async fn get_collaborator_permission(&self, _repo: &Repository, _user: &User) -> Permission {
        Permission::Unknown("fake".to_string())
    }

    async fn get_commits(&self, _repo: &Repository, _include_files: bool) -> Vec<Commit> {
        self.consume(Self::COMMITS_COST);
        Vec::new()
    }

    async fn get_contributors(&self, _repo: &Repository) -> Vec<Contributor> {
        Vec::new()
    }

    async fn get_issues(&self, _repo: &Repository) -> Vec<Issue> {
        Vec::new()
    }

    async fn get_pull_requests(&self, _repo: &Repository) -> Vec<PullRequest> {
        Vec::new()
    }

    async fn get_branches(&self, _repo: &Repository) -> Vec<Branch> {
        Vec::new()
    }

    async fn get_forks(&self, _repo: &Repository) -> Vec<Repository> {
        Vec::new()
    }

    async fn get_wiki_pages(&self, _repo: &Repository) -> Vec<WikiPage> {
        Vec::new()
    }

    async fn get_comments(&self, _repo: &Repository, _target: CommentTarget) -> Vec<Comment> {
        Vec::new()
    }

    async fn get_invites(&self, _repo: &Repository, _candidates: &[User]) -> Vec<Invite> {
        Vec::new()
    }

    async fn get_rate_limiting(&self) -> RateLimitInfo {
        RateLimitInfo {
            limit: 5000,
            remaining: self.remaining(),
            reset_at: None,
        }
    }

    async fn get_workflow_runs(&self, _repo: &Repository) -> Vec<WorkflowRun> {
        Vec::new()
    }
}

/// Factory that accepts only the tokens registered with [`FakeFactory::valid`].
#[derive(Default)]
pub struct FakeFactory {
    clients: HashMap<String, Arc<FakeApi>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(self, token: &str, remaining: usize) -> Self {
        self.with_client(token, FakeApi::new(remaining))
    }

    pub fn with_client(mut self, token: &str, api: FakeApi) -> Self {
        self.clients.insert(token.to_string(), Arc::new(api));
        self
    }

    /// Handle to the client built for `token`.
    pub fn api(&self, token: &str) -> Arc<FakeApi> {
        Arc::clone(&self.clients[token])
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    async fn connect(&self, token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        match self.clients.get(token) {
            Some(api) => Ok(Arc::clone(api) as Arc<dyn RepositoryApi>),
            None => Err(PlatformError::AuthRequired),
        }
    }
}
