//! Credential pool errors.

use thiserror::Error;

use crate::platform::ProviderKind;

/// Errors that end a run. Everything else the pool sees is logged and skipped.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Every supplied token failed validation.
    #[error("No valid credentials: all {attempted} token(s) were rejected")]
    NoValidCredentials { attempted: usize },

    /// Selection was attempted on an empty pool.
    #[error("No clients available in the credential pool")]
    NoClientsAvailable,

    #[error("{0} requires a base URL")]
    MissingBaseUrl(ProviderKind),
}
