//! GitHub adapter.
//!
//! Implements [`RepositoryApi`](crate::platform::RepositoryApi) on top of
//! octocrab, for github.com and GitHub Enterprise.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Wire structs for the REST responses the adapter reads
//! - [`client`] - Client creation, token validation and the trait implementation
//! - [`convert`] - Mapping into the shared model
//!
//! ```ignore
//! use forge_audit::github::GitHubClient;
//! use forge_audit::platform::{Pacer, RepositoryApi};
//!
//! let client = GitHubClient::connect(&token, None, Pacer::disabled()).await?;
//! if let Some(repo) = client.get_repository("octo/widgets").await {
//!     let commits = client.get_commits(&repo, false).await;
//! }
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{GITHUB_API_URL, GitHubClient, create_client, get_rate_limit};
pub use convert::get_user_data;
pub use error::{GitHubError, is_rate_limit_error, short_error_message, status_code};
pub use types::{GitHubRateLimitResponse, GitHubRateLimits, GitHubUser, RateLimitResource};
