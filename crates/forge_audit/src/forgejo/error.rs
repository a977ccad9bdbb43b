//! Error types for Forgejo API operations.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the Forgejo API.
#[derive(Debug, Error)]
pub enum ForgejoError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Repository identifier is not of the form `owner/name`.
    #[error("Invalid repository id '{0}', expected 'owner/name'")]
    InvalidRepositoryId(String),

    /// Wiki page content was not valid base64.
    #[error("Invalid wiki page encoding for '{page}': {message}")]
    WikiEncoding { page: String, message: String },

    /// Operation the Forgejo API does not expose.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ForgejoError> for PlatformError {
    fn from(err: ForgejoError) -> Self {
        match err {
            ForgejoError::Http(message) => PlatformError::Network { message },
            ForgejoError::Json(e) => PlatformError::Internal {
                message: format!("JSON parse error: {}", e),
            },
            ForgejoError::Api { status, message } => PlatformError::from_status(status, message),
            ForgejoError::InvalidRepositoryId(id) => PlatformError::Api {
                message: format!("invalid repository id '{}'", id),
            },
            e @ ForgejoError::WikiEncoding { .. } => PlatformError::Internal {
                message: e.to_string(),
            },
            ForgejoError::Unsupported(operation) => PlatformError::Unsupported { operation },
            ForgejoError::Config(message) => PlatformError::Internal { message },
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &ForgejoError) -> String {
    match err {
        ForgejoError::Http(_) => "Network error".to_string(),
        ForgejoError::Json(_) => "JSON parse error".to_string(),
        ForgejoError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        ForgejoError::InvalidRepositoryId(id) => format!("Invalid repository id: {}", id),
        ForgejoError::WikiEncoding { page, .. } => format!("Bad wiki encoding: {}", page),
        ForgejoError::Unsupported(op) => format!("Unsupported: {}", op),
        ForgejoError::Config(msg) => format!("Config: {}", msg),
    }
}
