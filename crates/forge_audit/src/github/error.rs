//! GitHub API error types.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// The token was rejected while building the client.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid repository id '{0}', expected 'owner/name'")]
    InvalidRepositoryId(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

// Re-export the shared short_error_message function from platform module
pub use crate::platform::short_error_message;

/// HTTP status of a GitHub error response, if the error carries one.
pub fn status_code(e: &octocrab::Error) -> Option<u16> {
    match e {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Check if an error indicates a rate limit (403/429 with a rate limit message).
pub fn is_rate_limit_error(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            status == 429 || (status == 403 && source.message.to_lowercase().contains("rate limit"))
        }
        _ => false,
    }
}

impl From<GitHubError> for PlatformError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api(ref e) if is_rate_limit_error(e) => PlatformError::RateLimited {
                reset_at: chrono::Utc::now() + chrono::Duration::minutes(1),
            },
            GitHubError::Api(octocrab::Error::GitHub { source, .. }) => {
                PlatformError::from_status(source.status_code.as_u16(), source.message)
            }
            GitHubError::Api(e @ octocrab::Error::Json { .. }) => PlatformError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            GitHubError::Api(e) => PlatformError::Network {
                message: e.to_string(),
            },
            GitHubError::Auth(_) => PlatformError::AuthRequired,
            GitHubError::InvalidRepositoryId(id) => PlatformError::Api {
                message: format!("invalid repository id '{}'", id),
            },
            GitHubError::Unsupported(operation) => PlatformError::Unsupported { operation },
        }
    }
}
