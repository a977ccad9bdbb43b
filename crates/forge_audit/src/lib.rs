//! forge-audit - read-only repository auditing across code forges.
//!
//! This library gives one interface over GitHub and Forgejo (and other
//! Gitea-compatible forges) for reading commits, contributors, issues, pull
//! requests, branches, comments, invites, workflow runs and wiki pages. A
//! credential pool rotates between tokens by remaining quota, and a lazy
//! binding stream pairs each requested repository with the client that
//! resolved it.
//!
//! # Features
//!
//! - `github` - GitHub adapter built on octocrab (default).
//! - `forgejo` - Forgejo/Gitea adapter over plain HTTP (default).
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use forge_audit::platform::DEFAULT_PACING;
//! use forge_audit::{ClientPool, Pacer, ProviderConfig, ProviderKind, bind_repositories};
//!
//! let pacer = Pacer::new(DEFAULT_PACING);
//! let config = ProviderConfig::new(ProviderKind::GitHub, None, pacer.clone())?;
//! let pool = ClientPool::build(&config, &tokens, pacer).await?;
//!
//! let mut bindings = std::pin::pin!(bind_repositories(&pool, names));
//! while let Some(binding) = bindings.next().await {
//!     for issue in binding.client.get_issues(&binding.repository).await {
//!         println!("{} #{} {}", binding.repository.id, issue.id, issue.title);
//!     }
//! }
//! ```

pub mod binding;
pub mod http;
pub mod input;
pub mod model;
pub mod platform;
pub mod pool;
pub mod stats;
pub mod timeline;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "forgejo")]
pub mod forgejo;

pub use binding::{Binding, bind_repositories};
pub use platform::{
    Capability, CommentTarget, Pacer, Permission, PlatformError, ProviderKind, RateLimitInfo,
    RepositoryApi,
};
pub use pool::{ClientFactory, ClientPool, PoolError, PooledClient, ProviderConfig};
