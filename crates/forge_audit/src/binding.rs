//! Lazy binding of repository names to pooled clients.

use std::sync::Arc;

use futures::Stream;
use futures::stream;

use crate::model::Repository;
use crate::platform::RepositoryApi;
use crate::pool::ClientPool;

/// A resolved repository with the client and token that resolved it.
#[derive(Clone)]
pub struct Binding {
    pub client: Arc<dyn RepositoryApi>,
    pub repository: Repository,
    pub token: String,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("provider", &self.client.provider())
            .field("repository", &self.repository.id)
            .finish_non_exhaustive()
    }
}

/// Resolve each `owner/name` on demand, one pool selection per name.
///
/// Names that cannot be resolved are logged and skipped. The stream keeps
/// input order and ends after the last name.
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut bindings = std::pin::pin!(bind_repositories(&pool, names));
/// while let Some(binding) = bindings.next().await {
///     let commits = binding.client.get_commits(&binding.repository, false).await;
/// }
/// ```
pub fn bind_repositories<'a, I>(pool: &'a ClientPool, names: I) -> impl Stream<Item = Binding> + 'a
where
    I: IntoIterator<Item = String>,
    I::IntoIter: 'a,
{
    stream::unfold(names.into_iter(), move |mut names| async move {
        loop {
            let name = names.next()?;

            let pooled = match pool.next_client().await {
                Ok(pooled) => pooled,
                Err(e) => {
                    tracing::warn!(repository = %name, error = %e, "No client to resolve repository");
                    continue;
                }
            };

            match pooled.api().get_repository(&name).await {
                Some(repository) => {
                    tracing::debug!(repository = %repository.id, "Bound repository");
                    let binding = Binding {
                        client: Arc::clone(pooled.api()),
                        repository,
                        token: pooled.token().to_string(),
                    };
                    return Some((binding, names));
                }
                None => {
                    tracing::warn!(repository = %name, "Skipping repository that could not be resolved");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::platform::Pacer;
    use crate::pool::fake::{FakeApi, FakeFactory};

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unresolvable_names_are_skipped_in_order() {
        let factory = FakeFactory::new().with_client("t", FakeApi::new(100).failing_on("o/three"));
        let pool = ClientPool::build(&factory, &names(&["t"]), Pacer::disabled())
            .await
            .unwrap();

        let bound: Vec<String> =
            bind_repositories(&pool, names(&["o/one", "o/two", "o/three", "o/four", "o/five"]))
                .map(|b| b.repository.id)
                .collect()
                .await;

        assert_eq!(bound, names(&["o/one", "o/two", "o/four", "o/five"]));
    }

    #[tokio::test]
    async fn test_each_name_selects_a_client() {
        let factory = FakeFactory::new().valid("a", 10).valid("b", 10);
        let pool = ClientPool::build(&factory, &names(&["a", "b"]), Pacer::disabled())
            .await
            .unwrap();

        // Each resolution costs one call and ties go to the first client,
        // so the two tokens alternate.
        let tokens: Vec<String> = bind_repositories(&pool, names(&["o/x", "o/y", "o/z"]))
            .map(|b| b.token)
            .collect()
            .await;

        assert_eq!(tokens, names(&["a", "b", "a"]));
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let factory = FakeFactory::new().valid("a", 10);
        let pool = ClientPool::build(&factory, &names(&["a"]), Pacer::disabled())
            .await
            .unwrap();

        let stream = bind_repositories(&pool, names(&["o/x", "o/y"]));
        let mut stream = std::pin::pin!(stream);
        assert_eq!(factory.api("a").remaining(), 10);

        let first = stream.next().await.unwrap();
        assert_eq!(first.repository.id, "o/x");
        assert_eq!(factory.api("a").remaining(), 9);

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_yields_nothing() {
        let factory = FakeFactory::new().valid("a", 10);
        let pool = ClientPool::build(&factory, &names(&["a"]), Pacer::disabled())
            .await
            .unwrap();

        let bound: Vec<Binding> = bind_repositories(&pool, Vec::new()).collect().await;
        assert!(bound.is_empty());
    }
}
