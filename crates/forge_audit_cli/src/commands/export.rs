//! Record export: walk the bound repositories and write one record per item.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use futures::StreamExt;
use serde::Serialize;

use forge_audit::http::HttpTransport;
use forge_audit::http::reqwest_transport::ReqwestTransport;
use forge_audit::model::{Branch, Comment, Commit, Invite, Issue, PullRequest, User, WikiPage, WorkflowRun};
use forge_audit::stats::{ContributorStats, contributor_stats};
use forge_audit::timeline::assignee_story;
use forge_audit::{Binding, Capability, ClientPool, CommentTarget, Permission, bind_repositories};

use crate::commands::limits::OutputFormat;

/// Which records an export run produces.
#[derive(Debug, Clone)]
pub(crate) enum ExportKind {
    Commits { include_files: bool },
    Contributors,
    Issues { comments: bool, assignees: bool },
    PullRequests { comments: bool, assignees: bool },
    Branches,
    Invites { candidates: Vec<User> },
    WorkflowRuns,
    Wiki,
}

impl ExportKind {
    fn needs_timeline(&self) -> bool {
        matches!(
            self,
            Self::Issues {
                assignees: true,
                ..
            } | Self::PullRequests {
                assignees: true,
                ..
            }
        )
    }

    fn capability(&self) -> Option<Capability> {
        match self {
            Self::Wiki => Some(Capability::WikiPages),
            Self::WorkflowRuns => Some(Capability::WorkflowRuns),
            _ => None,
        }
    }
}

/// A record that can be written as a JSON line or a table row.
pub(crate) trait Record: Serialize {
    /// Short identifier shown in the table.
    fn key(&self) -> String;
    /// One-line description shown in the table.
    fn summary(&self) -> String;
}

impl Record for Commit {
    fn key(&self) -> String {
        self.id.chars().take(7).collect()
    }

    fn summary(&self) -> String {
        self.message.lines().next().unwrap_or_default().to_string()
    }
}

impl Record for Branch {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn summary(&self) -> String {
        match self.last_commit {
            Some(ref commit) => format!("{} {}", commit.key(), commit.summary()),
            None => "-".to_string(),
        }
    }
}

impl Record for Invite {
    fn key(&self) -> String {
        self.invitee.login.clone()
    }

    fn summary(&self) -> String {
        match self.created_at {
            Some(at) => format!("invited {}", at.format("%Y-%m-%d")),
            None => "not a collaborator".to_string(),
        }
    }
}

impl Record for WikiPage {
    fn key(&self) -> String {
        self.title.clone()
    }

    fn summary(&self) -> String {
        format!("{} bytes", self.content.len())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ContributorRecord {
    #[serde(flatten)]
    pub(crate) stats: ContributorStats,
    pub(crate) permission: Permission,
}

impl Record for ContributorRecord {
    fn key(&self) -> String {
        self.stats.login.clone()
    }

    fn summary(&self) -> String {
        format!("{} commits, {}", self.stats.commits, self.permission)
    }
}

/// An issue or pull request with its optional extras.
#[derive(Debug, Serialize)]
pub(crate) struct ThreadRecord<T> {
    #[serde(flatten)]
    pub(crate) item: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comments: Option<Vec<Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) assignee_story: Option<String>,
}

impl Record for ThreadRecord<Issue> {
    fn key(&self) -> String {
        format!("#{}", self.item.id)
    }

    fn summary(&self) -> String {
        format!("[{}] {}", self.item.state, self.item.title)
    }
}

impl Record for ThreadRecord<PullRequest> {
    fn key(&self) -> String {
        format!("#{}", self.item.id)
    }

    fn summary(&self) -> String {
        format!(
            "[{}] {} ({} -> {})",
            self.item.state, self.item.title, self.item.head_ref, self.item.base_ref
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkflowRunRecord {
    #[serde(flatten)]
    pub(crate) run: WorkflowRun,
    pub(crate) duration_seconds: i64,
}

impl From<WorkflowRun> for WorkflowRunRecord {
    fn from(run: WorkflowRun) -> Self {
        let duration_seconds = run.duration().num_seconds();
        Self {
            run,
            duration_seconds,
        }
    }
}

impl Record for WorkflowRunRecord {
    fn key(&self) -> String {
        self.run.name.clone()
    }

    fn summary(&self) -> String {
        format!(
            "{} {} on {} in {}s",
            self.run.status,
            self.run.conclusion.as_deref().unwrap_or("-"),
            self.run.head_branch,
            self.duration_seconds
        )
    }
}

#[derive(Serialize)]
struct Envelope<'a, R> {
    repository: &'a str,
    record: &'a R,
}

#[derive(Debug, tabled::Tabled)]
struct RecordRow {
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Id")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

const SUMMARY_WIDTH: usize = 72;

fn truncate(text: String) -> String {
    if text.chars().count() <= SUMMARY_WIDTH {
        return text;
    }
    let mut short: String = text.chars().take(SUMMARY_WIDTH - 1).collect();
    short.push('…');
    short
}

/// Writes records as JSON lines immediately, or buffers them for one table.
pub(crate) struct Sink<W: Write> {
    format: OutputFormat,
    out: W,
    rows: Vec<RecordRow>,
    written: usize,
}

impl<W: Write> Sink<W> {
    pub(crate) fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out,
            rows: Vec::new(),
            written: 0,
        }
    }

    pub(crate) fn emit<R: Record>(
        &mut self,
        repository: &str,
        record: &R,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.written += 1;
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &Envelope { repository, record })?;
                writeln!(self.out)?;
            }
            OutputFormat::Table => self.rows.push(RecordRow {
                repository: repository.to_string(),
                key: record.key(),
                summary: truncate(record.summary()),
            }),
        }
        Ok(())
    }

    /// Flush output and return the number of records written.
    pub(crate) fn finish(mut self) -> Result<usize, Box<dyn std::error::Error>> {
        if !self.rows.is_empty() {
            let mut table = tabled::Table::new(std::mem::take(&mut self.rows));
            table.with(tabled::settings::Style::rounded());
            writeln!(self.out, "{}", table)?;
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Run one export over every named repository, and its forks when asked.
pub(crate) async fn handle_export(
    kind: ExportKind,
    pool: &ClientPool,
    names: Vec<String>,
    include_forks: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport: Option<Arc<dyn HttpTransport>> = if kind.needs_timeline() {
        Some(Arc::new(ReqwestTransport::with_timeout(StdDuration::from_secs(30))?))
    } else {
        None
    };

    let mut sink = Sink::new(format, std::io::stdout());
    let mut repositories = 0usize;

    let mut bindings = std::pin::pin!(bind_repositories(pool, names));
    while let Some(binding) = bindings.next().await {
        export_repository(&kind, &binding, transport.as_deref(), &mut sink).await?;
        repositories += 1;

        if include_forks {
            for fork in binding.client.get_forks(&binding.repository).await {
                let fork = Binding {
                    client: Arc::clone(&binding.client),
                    repository: fork,
                    token: binding.token.clone(),
                };
                export_repository(&kind, &fork, transport.as_deref(), &mut sink).await?;
                repositories += 1;
            }
        }
    }

    let records = sink.finish()?;
    tracing::info!(repositories, records, "Export complete");
    Ok(())
}

async fn story(transport: Option<&dyn HttpTransport>, binding: &Binding, number: u64) -> Option<String> {
    let transport = transport?;
    match assignee_story(transport, binding, number).await {
        Ok(story) => Some(story),
        Err(e) => {
            tracing::warn!(
                repository = %binding.repository.id,
                number,
                error = %e,
                "Could not read assignee history"
            );
            None
        }
    }
}

async fn export_repository<W: Write>(
    kind: &ExportKind,
    binding: &Binding,
    transport: Option<&dyn HttpTransport>,
    sink: &mut Sink<W>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = &binding.client;
    let repo = &binding.repository;
    let id = repo.id.as_str();

    if let Some(capability) = kind.capability()
        && !client.supports(capability)
    {
        tracing::info!(
            repository = id,
            provider = %client.provider(),
            ?capability,
            "Provider does not offer this data, skipping"
        );
        return Ok(());
    }

    tracing::info!(repository = id, "Exporting");

    match kind {
        ExportKind::Commits { include_files } => {
            for commit in client.get_commits(repo, *include_files).await {
                sink.emit(id, &commit)?;
            }
        }
        ExportKind::Contributors => {
            for stats in contributor_stats(client.as_ref(), repo).await {
                let user = User::from_login(stats.login.clone());
                let permission = client.get_collaborator_permission(repo, &user).await;
                sink.emit(id, &ContributorRecord { stats, permission })?;
            }
        }
        ExportKind::Issues {
            comments,
            assignees,
        } => {
            for issue in client.get_issues(repo).await {
                let comments = if *comments {
                    Some(client.get_comments(repo, CommentTarget::from(&issue)).await)
                } else {
                    None
                };
                let assignee_story = if *assignees {
                    story(transport, binding, issue.id).await
                } else {
                    None
                };
                sink.emit(
                    id,
                    &ThreadRecord {
                        item: issue,
                        comments,
                        assignee_story,
                    },
                )?;
            }
        }
        ExportKind::PullRequests {
            comments,
            assignees,
        } => {
            for pull in client.get_pull_requests(repo).await {
                let comments = if *comments {
                    Some(client.get_comments(repo, CommentTarget::from(&pull)).await)
                } else {
                    None
                };
                let assignee_story = if *assignees {
                    story(transport, binding, pull.id).await
                } else {
                    None
                };
                sink.emit(
                    id,
                    &ThreadRecord {
                        item: pull,
                        comments,
                        assignee_story,
                    },
                )?;
            }
        }
        ExportKind::Branches => {
            for branch in client.get_branches(repo).await {
                sink.emit(id, &branch)?;
            }
        }
        ExportKind::Invites { candidates } => {
            for invite in client.get_invites(repo, candidates).await {
                sink.emit(id, &invite)?;
            }
        }
        ExportKind::WorkflowRuns => {
            for run in client.get_workflow_runs(repo).await {
                sink.emit(id, &WorkflowRunRecord::from(run))?;
            }
        }
        ExportKind::Wiki => {
            for page in client.get_wiki_pages(repo).await {
                sink.emit(id, &page)?;
            }
        }
    }

    Ok(())
}
