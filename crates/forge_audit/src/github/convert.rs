//! Mapping from GitHub wire types to the shared model.

use super::types::{
    GitHubComment, GitHubCommit, GitHubInvitation, GitHubIssue, GitHubPullRequest, GitHubRepo,
    GitHubUser, GitHubWorkflowRun,
};
use crate::model::{
    Branch, Comment, Commit, Invite, Issue, IssueState, PullRequest, Repository, User, WorkflowRun,
};

/// Normalize a GitHub account into a [`User`].
///
/// List payloads carry only the simple user form, so `name`, `email` and
/// `bio` are often absent; the display name then falls back to the login.
pub fn get_user_data(user: &GitHubUser) -> User {
    User {
        login: user.login.clone(),
        username: user
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.login.clone()),
        email: user.email.clone().unwrap_or_default(),
        html_url: user.html_url.clone(),
        node_id: user.node_id.clone(),
        user_type: user.user_type.clone(),
        bio: user.bio.clone().unwrap_or_default(),
        site_admin: user.site_admin,
        id: user.id,
    }
}

pub fn to_repository(repo: &GitHubRepo) -> Repository {
    let default_branch = Branch::unresolved(repo.default_branch.as_deref().unwrap_or("main"));
    Repository::new(
        get_user_data(&repo.owner),
        repo.name.clone(),
        repo.html_url.clone(),
        default_branch,
    )
}

/// Map a commit. `files` is populated only when `include_files` is set, and
/// line counts only when the payload came from the single-commit endpoint.
pub fn to_commit(commit: &GitHubCommit, include_files: bool) -> Commit {
    let git_author = commit.commit.author.as_ref();
    let date = git_author
        .and_then(|a| a.date)
        .or_else(|| commit.commit.committer.as_ref().and_then(|c| c.date))
        .unwrap_or_default();

    let author = commit.author.as_ref().map(|account| {
        let mut user = get_user_data(account);
        if user.email.is_empty()
            && let Some(identity) = git_author
        {
            user.email = identity.email.clone();
        }
        user
    });

    let files = include_files.then(|| {
        commit
            .files
            .as_ref()
            .map(|files| files.iter().map(|f| f.filename.clone()).collect())
            .unwrap_or_default()
    });

    Commit {
        id: commit.sha.clone(),
        message: commit.commit.message.clone(),
        author,
        date,
        files,
        additions: commit.stats.as_ref().map(|s| s.additions),
        deletions: commit.stats.as_ref().map(|s| s.deletions),
    }
}

pub fn to_issue(issue: &GitHubIssue, closed_by: Option<User>) -> Issue {
    let state = IssueState::from_api(&issue.state);
    Issue {
        id: issue.number,
        title: issue.title.clone(),
        state,
        created_at: issue.created_at,
        closed_at: match state {
            IssueState::Closed => issue.closed_at,
            IssueState::Open => None,
        },
        closed_by: closed_by.or_else(|| issue.closed_by.as_ref().map(get_user_data)),
        body: issue.body.clone().unwrap_or_default(),
        user: get_user_data(&issue.user),
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
    }
}

pub fn to_pull_request(
    pull: &GitHubPullRequest,
    merged_by: Option<User>,
    files: Vec<String>,
) -> PullRequest {
    PullRequest {
        id: pull.number,
        title: pull.title.clone(),
        author: get_user_data(&pull.user),
        state: IssueState::from_api(&pull.state),
        created_at: pull.created_at,
        head_label: pull.head.label.clone(),
        base_label: pull.base.label.clone(),
        head_ref: pull.head.ref_name.clone(),
        base_ref: pull.base.ref_name.clone(),
        merged_by: merged_by.or_else(|| pull.merged_by.as_ref().map(get_user_data)),
        files,
        issue_url: pull.issue_url.clone(),
        labels: pull.labels.iter().map(|l| l.name.clone()).collect(),
        milestone: pull.milestone.as_ref().map(|m| m.title.clone()),
    }
}

pub fn to_comment(comment: &GitHubComment) -> Comment {
    Comment {
        body: comment.body.clone().unwrap_or_default(),
        created_at: comment.created_at,
        author: comment.user.as_ref().map(get_user_data).unwrap_or_default(),
    }
}

pub fn to_invite(invitation: &GitHubInvitation) -> Invite {
    Invite {
        id: invitation.id,
        invitee: invitation
            .invitee
            .as_ref()
            .map(get_user_data)
            .unwrap_or_default(),
        created_at: Some(invitation.created_at),
        html_url: invitation.html_url.clone(),
    }
}

pub fn to_workflow_run(run: &GitHubWorkflowRun) -> WorkflowRun {
    WorkflowRun {
        display_title: run.display_title.clone(),
        event: run.event.clone(),
        head_branch: run.head_branch.clone().unwrap_or_default(),
        head_sha: run.head_sha.clone(),
        name: run.name.clone().unwrap_or_default(),
        path: run.path.clone(),
        created_at: run.created_at,
        run_started_at: run.run_started_at,
        updated_at: run.updated_at,
        conclusion: run.conclusion.clone(),
        status: run.status.clone().unwrap_or_default(),
        url: run.url.clone(),
    }
}
