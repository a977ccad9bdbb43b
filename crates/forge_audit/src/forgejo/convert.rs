//! Mapping from Forgejo wire types to the shared model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::ForgejoError;
use super::types::{
    ForgejoBranch, ForgejoComment, ForgejoCommit, ForgejoIssue, ForgejoPayloadCommit,
    ForgejoPayloadUser, ForgejoPullRequest, ForgejoRepo, ForgejoUser, ForgejoWikiPage,
};
use crate::model::{
    Branch, Comment, Commit, Invite, Issue, IssueState, PullRequest, Repository, User, WikiPage,
};

/// Normalize a Forgejo account into a [`User`].
///
/// Forgejo has no node IDs or account types, so the numeric ID stands in for
/// the node ID and the type is left empty.
pub fn get_user_data(user: &ForgejoUser) -> User {
    User {
        login: user.login.clone(),
        username: if user.full_name.is_empty() {
            user.login.clone()
        } else {
            user.full_name.clone()
        },
        email: user.email.clone(),
        html_url: user.html_url.clone(),
        node_id: user.id.to_string(),
        user_type: String::new(),
        bio: user.description.clone(),
        site_admin: user.is_admin,
        id: user.id,
    }
}

pub fn to_repository(repo: &ForgejoRepo) -> Repository {
    let default_branch = Branch::unresolved(repo.default_branch.as_deref().unwrap_or("main"));
    Repository::new(
        get_user_data(&repo.owner),
        repo.name.clone(),
        repo.html_url.clone(),
        default_branch,
    )
}

pub fn to_commit(commit: &ForgejoCommit, include_files: bool) -> Commit {
    let git_author = commit.commit.author.as_ref();
    let date = git_author
        .and_then(|a| a.date)
        .or_else(|| commit.commit.committer.as_ref().and_then(|c| c.date))
        .or(commit.created)
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

fn payload_user(user: &ForgejoPayloadUser) -> User {
    User {
        login: user.username.clone(),
        username: user.name.clone(),
        email: user.email.clone(),
        ..User::default()
    }
}

fn payload_commit(commit: &ForgejoPayloadCommit) -> Commit {
    Commit {
        id: commit.id.clone(),
        message: commit.message.clone(),
        author: commit.author.as_ref().map(payload_user),
        date: commit.timestamp,
        files: None,
        additions: None,
        deletions: None,
    }
}

pub fn to_branch(branch: &ForgejoBranch) -> Branch {
    Branch {
        name: branch.name.clone(),
        last_commit: branch.commit.as_ref().map(payload_commit),
    }
}

pub fn to_issue(issue: &ForgejoIssue) -> Issue {
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
        closed_by: None,
        body: issue.body.clone().unwrap_or_default(),
        user: get_user_data(&issue.user),
        labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
        milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
    }
}

pub fn to_pull_request(
    pull: &ForgejoPullRequest,
    files: Vec<String>,
    issue_url: String,
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
        merged_by: pull.merged_by.as_ref().map(get_user_data),
        files,
        issue_url: Some(issue_url),
        labels: pull.labels.iter().map(|l| l.name.clone()).collect(),
        milestone: pull.milestone.as_ref().map(|m| m.title.clone()),
    }
}

pub fn to_comment(comment: &ForgejoComment) -> Comment {
    Comment {
        body: comment.body.clone(),
        created_at: comment.created_at,
        author: comment.user.as_ref().map(get_user_data).unwrap_or_default(),
    }
}

/// Decode a wiki page body. Invalid UTF-8 is replaced rather than rejected.
pub fn to_wiki_page(page: &ForgejoWikiPage) -> Result<WikiPage, ForgejoError> {
    let compact: String = page
        .content_base64
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ForgejoError::WikiEncoding {
            page: page.title.clone(),
            message: e.to_string(),
        })?;
    Ok(WikiPage {
        title: page.title.clone(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Report every candidate who is not yet a collaborator as a pending invite.
///
/// These invites carry no ID or creation time since Forgejo has no invitation
/// API to read them from.
pub fn synthesize_invites(collaborators: &[User], candidates: &[User]) -> Vec<Invite> {
    candidates
        .iter()
        .filter(|candidate| {
            !collaborators
                .iter()
                .any(|c| c.login.eq_ignore_ascii_case(&candidate.login))
        })
        .map(|candidate| Invite {
            id: 0,
            invitee: candidate.clone(),
            created_at: None,
            html_url: candidate.html_url.clone(),
        })
        .collect()
}
