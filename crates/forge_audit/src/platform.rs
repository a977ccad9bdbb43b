//! Provider-agnostic contract for forge clients.
//!
//! This module defines the [`RepositoryApi`] trait that gives exporters one
//! interface over GitHub and Forgejo, plus the shared error type, quota and
//! permission types, and request pacing.
//!
//! # Example
//!
//! ```ignore
//! use forge_audit::platform::RepositoryApi;
//!
//! async fn count_commits(client: &dyn RepositoryApi, id: &str) -> usize {
//!     match client.get_repository(id).await {
//!         Some(repo) => client.get_commits(&repo, false).await.len(),
//!         None => 0,
//!     }
//! }
//! ```

mod errors;
mod fallback;
mod pacing;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use fallback::{or_empty, permission_or_unknown};
pub use pacing::{DEFAULT_PACING, Pacer};
pub use types::{
    Capability, CommentTarget, Permission, ProviderKind, RateLimitInfo, RepositoryApi,
};
