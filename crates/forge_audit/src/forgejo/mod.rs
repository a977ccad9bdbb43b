//! Forgejo adapter.
//!
//! Implements [`RepositoryApi`](crate::platform::RepositoryApi) for Forgejo
//! and other Gitea-compatible forges (Gitea, Codeberg).
//!
//! # Module Structure
//!
//! - [`error`] - Error types for Forgejo API operations
//! - [`types`] - Wire structs for the `/api/v1` responses
//! - [`client`] - HTTP client and the trait implementation
//! - [`convert`] - Mapping into the shared model
//!
//! Forgejo lacks a few GitHub APIs, so some operations are approximated:
//! invites are synthesized by diffing candidates against collaborators,
//! workflow runs are unsupported and quota is reported as unlimited.

mod client;
mod convert;
mod error;
mod types;

pub use client::ForgejoClient;
pub use convert::get_user_data;
pub use error::{ForgejoError, short_error_message};
pub use types::ForgejoUser;
