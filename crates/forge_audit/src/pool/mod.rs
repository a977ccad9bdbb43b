//! Credential pool.
//!
//! Holds one authenticated client per valid token and hands out the client
//! with the most remaining quota on each request, so API usage drifts away
//! from throttled tokens.
//!
//! ```ignore
//! use forge_audit::platform::{DEFAULT_PACING, Pacer, ProviderKind};
//! use forge_audit::pool::{ClientPool, ProviderConfig};
//!
//! let pacer = Pacer::new(DEFAULT_PACING);
//! let config = ProviderConfig::new(ProviderKind::GitHub, None, pacer.clone())?;
//! let pool = ClientPool::build(&config, &tokens, pacer).await?;
//! let client = pool.next_client().await?;
//! ```

mod error;
#[cfg(test)]
pub(crate) mod fake;

use std::sync::Arc;

use async_trait::async_trait;

use crate::platform::{Pacer, PlatformError, ProviderKind, RepositoryApi, short_error_message};

pub use error::PoolError;

/// Builds one client from one token.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Create a client, failing when the token is unusable.
    async fn connect(&self, token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError>;
}

/// Provider selection plus the settings every pooled client shares.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    kind: ProviderKind,
    base_url: Option<String>,
    pacer: Pacer,
}

impl ProviderConfig {
    /// Forgejo needs a base URL; GitHub treats one as an Enterprise API root.
    pub fn new(
        kind: ProviderKind,
        base_url: Option<String>,
        pacer: Pacer,
    ) -> Result<Self, PoolError> {
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if kind == ProviderKind::Forgejo && base_url.is_none() {
            return Err(PoolError::MissingBaseUrl(kind));
        }

        Ok(Self {
            kind,
            base_url,
            pacer,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[cfg(feature = "github")]
    async fn connect_github(&self, token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        let client =
            crate::github::GitHubClient::connect(token, self.base_url(), self.pacer.clone())
                .await?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "github"))]
    async fn connect_github(&self, _token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        Err(PlatformError::Unsupported {
            operation: "github adapter (built without the `github` feature)",
        })
    }

    #[cfg(feature = "forgejo")]
    fn connect_forgejo(&self, token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        let host = self
            .base_url()
            .ok_or_else(|| PlatformError::api("forgejo requires a base URL"))?;
        let client = crate::forgejo::ForgejoClient::new(host, token, self.pacer.clone())?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "forgejo"))]
    fn connect_forgejo(&self, _token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        Err(PlatformError::Unsupported {
            operation: "forgejo adapter (built without the `forgejo` feature)",
        })
    }
}

#[async_trait]
impl ClientFactory for ProviderConfig {
    async fn connect(&self, token: &str) -> Result<Arc<dyn RepositoryApi>, PlatformError> {
        match self.kind {
            ProviderKind::GitHub => self.connect_github(token).await,
            ProviderKind::Forgejo => self.connect_forgejo(token),
        }
    }
}

/// A pooled client together with the token it was built from.
#[derive(Clone)]
pub struct PooledClient {
    api: Arc<dyn RepositoryApi>,
    token: String,
}

impl PooledClient {
    pub fn new(api: Arc<dyn RepositoryApi>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }

    pub fn api(&self) -> &Arc<dyn RepositoryApi> {
        &self.api
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for PooledClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledClient")
            .field("provider", &self.api.provider())
            .field("base_url", &self.api.get_base_url())
            .finish_non_exhaustive()
    }
}

/// Quota-aware set of clients.
#[derive(Debug)]
pub struct ClientPool {
    clients: Vec<PooledClient>,
    pacer: Pacer,
}

impl ClientPool {
    /// Connect one client per token, skipping tokens the factory rejects.
    ///
    /// Fails only when no token produced a client.
    pub async fn build<F>(factory: &F, tokens: &[String], pacer: Pacer) -> Result<Self, PoolError>
    where
        F: ClientFactory + ?Sized,
    {
        let mut clients = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            match factory.connect(token).await {
                Ok(api) => {
                    tracing::debug!(index, provider = %api.provider(), "Token accepted");
                    clients.push(PooledClient::new(api, token.clone()));
                }
                Err(e) => {
                    tracing::warn!(
                        index,
                        error = %short_error_message(&e),
                        "Skipping token that could not be used"
                    );
                }
            }
        }

        if clients.is_empty() {
            return Err(PoolError::NoValidCredentials {
                attempted: tokens.len(),
            });
        }

        tracing::info!(
            clients = clients.len(),
            rejected = tokens.len() - clients.len(),
            "Credential pool ready"
        );

        Ok(Self { clients, pacer })
    }

    /// Wrap already-connected clients.
    pub fn from_clients(clients: Vec<PooledClient>, pacer: Pacer) -> Self {
        Self { clients, pacer }
    }

    /// Return the client with the most remaining quota right now.
    ///
    /// Every client is queried on each call. Ties go to the client that was
    /// added first.
    pub async fn next_client(&self) -> Result<PooledClient, PoolError> {
        let mut best: Option<(&PooledClient, usize)> = None;

        for client in &self.clients {
            self.pacer.pace().await;
            let remaining = client.api.get_rate_limiting().await.remaining;
            if best.is_none_or(|(_, max)| remaining > max) {
                best = Some((client, remaining));
            }
        }

        let (client, remaining) = best.ok_or(PoolError::NoClientsAvailable)?;
        tracing::debug!(
            provider = %client.api.provider(),
            remaining,
            "Selected client"
        );
        Ok(client.clone())
    }

    pub fn clients(&self) -> &[PooledClient] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeApi, FakeFactory};
    use super::*;

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_next_client_picks_strict_maximum() {
        let factory = FakeFactory::new()
            .valid("low", 30)
            .valid("high", 80)
            .valid("mid", 50);

        let pool = ClientPool::build(&factory, &tokens(&["low", "high", "mid"]), Pacer::disabled())
            .await
            .unwrap();

        let client = pool.next_client().await.unwrap();
        assert_eq!(client.token(), "high");
    }

    #[tokio::test]
    async fn test_depletion_shifts_selection() {
        let factory = FakeFactory::new().valid("a", 100).valid("b", 90);
        let pool = ClientPool::build(&factory, &tokens(&["a", "b"]), Pacer::disabled())
            .await
            .unwrap();

        assert_eq!(pool.next_client().await.unwrap().token(), "a");

        factory.api("a").consume(20);

        assert_eq!(pool.next_client().await.unwrap().token(), "b");
    }

    #[tokio::test]
    async fn test_ties_go_to_first_client() {
        let factory = FakeFactory::new().valid("first", 40).valid("second", 40);
        let pool = ClientPool::build(&factory, &tokens(&["first", "second"]), Pacer::disabled())
            .await
            .unwrap();

        assert_eq!(pool.next_client().await.unwrap().token(), "first");
    }

    #[tokio::test]
    async fn test_build_skips_invalid_tokens() {
        let factory = FakeFactory::new().valid("good-1", 10).valid("good-2", 10);
        let pool = ClientPool::build(
            &factory,
            &tokens(&["bad-1", "good-1", "bad-2", "good-2"]),
            Pacer::disabled(),
        )
        .await
        .unwrap();

        let pooled: Vec<&str> = pool.clients().iter().map(PooledClient::token).collect();
        assert_eq!(pooled, vec!["good-1", "good-2"]);
    }

    #[tokio::test]
    async fn test_build_without_valid_tokens_fails() {
        let factory = FakeFactory::new();
        let err = ClientPool::build(&factory, &tokens(&["bad-1", "bad-2"]), Pacer::disabled())
            .await
            .unwrap_err();

        assert!(matches!(err, PoolError::NoValidCredentials { attempted: 2 }));

        let err = ClientPool::build(&factory, &[], Pacer::disabled())
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::NoValidCredentials { attempted: 0 }));
    }

    #[tokio::test]
    async fn test_empty_pool_has_no_clients() {
        let pool = ClientPool::from_clients(Vec::new(), Pacer::disabled());
        assert!(pool.is_empty());
        assert!(matches!(
            pool.next_client().await,
            Err(PoolError::NoClientsAvailable)
        ));
    }

    #[tokio::test]
    async fn test_busiest_token_loses_quota_after_export() {
        let factory = FakeFactory::new().valid("a", 100).valid("b", 50);
        let pool = ClientPool::build(&factory, &tokens(&["a", "b"]), Pacer::disabled())
            .await
            .unwrap();

        let client = pool.next_client().await.unwrap();
        assert_eq!(client.token(), "a");

        let repo = client.api().get_repository("octo/widgets").await.unwrap();
        client.api().get_commits(&repo, false).await;

        let after = client.api().get_rate_limiting().await.remaining;
        assert!(after < 100);
        assert_eq!(after, 100 - 1 - FakeApi::COMMITS_COST);
    }

    #[test]
    fn test_forgejo_config_requires_base_url() {
        let err = ProviderConfig::new(ProviderKind::Forgejo, None, Pacer::disabled()).unwrap_err();
        assert!(matches!(err, PoolError::MissingBaseUrl(ProviderKind::Forgejo)));

        let err = ProviderConfig::new(ProviderKind::Forgejo, Some("  ".into()), Pacer::disabled())
            .unwrap_err();
        assert!(matches!(err, PoolError::MissingBaseUrl(_)));

        let config = ProviderConfig::new(ProviderKind::GitHub, None, Pacer::disabled()).unwrap();
        assert_eq!(config.kind(), ProviderKind::GitHub);
        assert!(config.base_url().is_none());
    }

    #[cfg(feature = "forgejo")]
    #[tokio::test]
    async fn test_forgejo_config_connects_without_network() {
        let config = ProviderConfig::new(
            ProviderKind::Forgejo,
            Some("https://codeberg.org/".into()),
            Pacer::disabled(),
        )
        .unwrap();

        let api = config.connect("token").await.unwrap();
        assert_eq!(api.provider(), ProviderKind::Forgejo);
        assert_eq!(api.get_base_url(), "https://codeberg.org/api/v1");
        assert!(api.get_rate_limiting().await.is_unlimited());
    }
}
