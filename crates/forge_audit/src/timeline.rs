//! Assignment history of an issue or pull request, read from the raw
//! timeline endpoint that neither adapter exposes as a typed method.

use serde::Deserialize;
use thiserror::Error;

use crate::binding::Binding;
use crate::http::{HttpError, HttpTransport, HttpRequest};
use crate::platform::ProviderKind;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Failed to fetch issue timeline: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Account {
    login: String,
}

/// One timeline entry in either provider's shape.
///
/// GitHub names the kind in `event` and the acting user in `actor`; Forgejo
/// uses `type`, `user` and a `removed_assignee` flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimelineEvent {
    event: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    created_at: String,
    actor: Option<Account>,
    user: Option<Account>,
    assignee: Option<Account>,
    removed_assignee: bool,
}

enum Assignment {
    Assigned,
    Unassigned,
}

impl TimelineEvent {
    fn assignment(&self) -> Option<Assignment> {
        match (self.event.as_deref(), self.kind.as_deref()) {
            (Some("assigned"), _) => Some(Assignment::Assigned),
            (Some("unassigned"), _) => Some(Assignment::Unassigned),
            (_, Some("assignees")) if self.removed_assignee => Some(Assignment::Unassigned),
            (_, Some("assignees")) => Some(Assignment::Assigned),
            _ => None,
        }
    }

    fn actor_login(&self) -> &str {
        self.actor
            .as_ref()
            .or(self.user.as_ref())
            .map_or("unknown", |a| a.login.as_str())
    }

    fn assignee_login(&self) -> &str {
        self.assignee
            .as_ref()
            .map_or("unknown", |a| a.login.as_str())
    }
}

/// Render assignment events as `"{created_at}: {actor} -> {assignee}; "`,
/// with `-/>` marking an unassignment.
fn render(events: &[TimelineEvent]) -> String {
    events
        .iter()
        .filter_map(|event| {
            let arrow = match event.assignment()? {
                Assignment::Assigned => "->",
                Assignment::Unassigned => "-/>",
            };
            Some(format!(
                "{}: {} {} {}; ",
                event.created_at,
                event.actor_login(),
                arrow,
                event.assignee_login()
            ))
        })
        .collect()
}

/// Paging query for one timeline page. GitHub defaults to 30 events per page
/// and Forgejo to its configured page size, so both are set explicitly.
fn page_query(provider: ProviderKind, page: usize) -> (String, usize) {
    match provider {
        ProviderKind::GitHub => (format!("per_page=100&page={page}"), 100),
        ProviderKind::Forgejo => (format!("page={page}&limit=50"), 50),
    }
}

/// Fetch the timeline of issue or pull request `number` in the bound
/// repository and summarize who assigned whom.
///
/// Pages are read until one comes back short.
pub async fn assignee_story(
    transport: &dyn HttpTransport,
    binding: &Binding,
    number: u64,
) -> Result<String, TimelineError> {
    let provider = binding.client.provider();
    let base_url = binding.client.get_base_url();
    let (owner, name) = binding.repository.owner_and_name();
    let route = format!(
        "{}/repos/{owner}/{name}/issues/{number}/timeline",
        base_url.trim_end_matches('/')
    );

    let mut events = Vec::new();
    let mut page = 1;
    loop {
        let (query, page_size) = page_query(provider, page);
        tracing::debug!(
            repository = %binding.repository.id,
            number,
            page,
            "Fetching issue timeline"
        );
        let response = transport
            .send(HttpRequest::get(format!("{route}?{query}")).authorized(provider, &binding.token))
            .await?;

        if response.status != 200 {
            return Err(TimelineError::Status {
                status: response.status,
                body: response.text(),
            });
        }

        let batch: Vec<TimelineEvent> = serde_json::from_slice(&response.body)?;
        let count = batch.len();
        events.extend(batch);

        if count < page_size {
            break;
        }
        page += 1;
    }

    Ok(render(&events))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::MockTransport;
    use crate::model::{Branch, Repository, User};
    use crate::pool::fake::FakeApi;

    fn binding(api: Arc<dyn crate::platform::RepositoryApi>) -> Binding {
        Binding {
            client: api,
            repository: Repository::new(
                User::from_login("octo"),
                "widgets",
                "https://fake.test/octo/widgets",
                Branch::unresolved("main"),
            ),
            token: "secret".to_string(),
        }
    }

    const TIMELINE: &str = "https://fake.test/repos/octo/widgets/issues/7/timeline";

    fn page(number: usize) -> String {
        format!("{TIMELINE}?per_page=100&page={number}")
    }

    #[tokio::test]
    async fn test_github_events_render_assignments_only() {
        let transport = MockTransport::new();
        transport.push_json(
            page(1),
            serde_json::json!([
                {"event": "labeled", "created_at": "2024-01-01T00:00:00Z", "actor": {"login": "a"}},
                {"event": "assigned", "created_at": "2024-01-02T00:00:00Z",
                 "actor": {"login": "lead"}, "assignee": {"login": "dev"}},
                {"event": "unassigned", "created_at": "2024-01-03T00:00:00Z",
                 "actor": {"login": "lead"}, "assignee": {"login": "dev"}}
            ]),
        );

        let story = assignee_story(&transport, &binding(Arc::new(FakeApi::new(1))), 7)
            .await
            .unwrap();

        assert_eq!(
            story,
            "2024-01-02T00:00:00Z: lead -> dev; 2024-01-03T00:00:00Z: lead -/> dev; "
        );

        let requests = transport.requests();
        assert_eq!(
            requests[0].header_value("Authorization"),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn test_long_timelines_are_read_page_by_page() {
        let assigned = |i: usize| {
            serde_json::json!({"event": "assigned", "created_at": format!("t{i}"),
                               "actor": {"login": "lead"}, "assignee": {"login": format!("dev{i}")}})
        };
        let transport = MockTransport::new();
        transport.push_json(
            page(1),
            serde_json::Value::Array((0..100).map(assigned).collect()),
        );
        transport.push_json(page(2), serde_json::json!([assigned(100)]));

        let story = assignee_story(&transport, &binding(Arc::new(FakeApi::new(1))), 7)
            .await
            .unwrap();

        assert_eq!(story.matches("; ").count(), 101);
        assert!(story.ends_with("t100: lead -> dev100; "));
        assert_eq!(transport.requested_urls(), vec![page(1), page(2)]);
    }

    #[test]
    fn test_page_query_matches_provider_paging() {
        assert_eq!(
            page_query(ProviderKind::GitHub, 2),
            ("per_page=100&page=2".to_string(), 100)
        );
        assert_eq!(
            page_query(ProviderKind::Forgejo, 1),
            ("page=1&limit=50".to_string(), 50)
        );
    }

    #[test]
    fn test_forgejo_events_use_type_and_removed_flag() {
        let events: Vec<TimelineEvent> = serde_json::from_value(serde_json::json!([
            {"type": "assignees", "created_at": "2024-02-01T00:00:00Z",
             "user": {"login": "lead"}, "assignee": {"login": "dev"}, "removed_assignee": false},
            {"type": "assignees", "created_at": "2024-02-02T00:00:00Z",
             "user": {"login": "lead"}, "assignee": {"login": "dev"}, "removed_assignee": true},
            {"type": "comment", "created_at": "2024-02-03T00:00:00Z", "user": {"login": "x"}}
        ]))
        .unwrap();

        assert_eq!(
            render(&events),
            "2024-02-01T00:00:00Z: lead -> dev; 2024-02-02T00:00:00Z: lead -/> dev; "
        );
    }

    #[test]
    fn test_missing_accounts_render_as_unknown() {
        let events: Vec<TimelineEvent> = serde_json::from_value(serde_json::json!([
            {"event": "assigned", "created_at": "2024-01-02T00:00:00Z"}
        ]))
        .unwrap();

        assert_eq!(render(&events), "2024-01-02T00:00:00Z: unknown -> unknown; ");
    }

    #[tokio::test]
    async fn test_non_200_is_an_error() {
        let transport = MockTransport::new();
        transport.push_status(page(1), 404, "Not Found");

        let err = assignee_story(&transport, &binding(Arc::new(FakeApi::new(1))), 7)
            .await
            .unwrap_err();

        assert!(matches!(err, TimelineError::Status { status: 404, .. }));
    }
}
