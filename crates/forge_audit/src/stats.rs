//! Per-contributor commit totals.

use serde::Serialize;

use crate::model::{Commit, Repository};
use crate::platform::RepositoryApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorStats {
    pub login: String,
    pub email: String,
    pub commits: usize,
}

/// Count commits per linked author, in order of first appearance.
///
/// Commits whose author has no account are not attributed.
pub fn tally(commits: &[Commit]) -> Vec<ContributorStats> {
    let mut stats: Vec<ContributorStats> = Vec::new();

    for author in commits.iter().filter_map(|c| c.author.as_ref()) {
        match stats.iter_mut().find(|s| s.login == author.login) {
            Some(entry) => {
                entry.commits += 1;
                if entry.email.is_empty() {
                    entry.email = author.email.clone();
                }
            }
            None => stats.push(ContributorStats {
                login: author.login.clone(),
                email: author.email.clone(),
                commits: 1,
            }),
        }
    }

    stats
}

/// Fetch the commit history of `repo` (without files) and tally it.
pub async fn contributor_stats(api: &dyn RepositoryApi, repo: &Repository) -> Vec<ContributorStats> {
    let commits = api.get_commits(repo, false).await;
    tracing::debug!(repository = %repo.id, commits = commits.len(), "Tallying contributors");
    tally(&commits)
}
