//! Soft-fail helpers applied at the [`RepositoryApi`](super::RepositoryApi) boundary.

use crate::model::Repository;

use super::errors::{PlatformError, short_error_message};
use super::types::Permission;

/// Unwrap a list result, logging the failure and returning an empty list.
///
/// Unsupported operations are logged at debug level since they are expected
/// for some providers.
pub fn or_empty<T, E>(
    operation: &'static str,
    repo: &Repository,
    result: Result<Vec<T>, E>,
) -> Vec<T>
where
    E: Into<PlatformError>,
{
    match result {
        Ok(items) => items,
        Err(e) => {
            let err: PlatformError = e.into();
            match err {
                PlatformError::Unsupported { .. } => {
                    tracing::debug!(operation, repository = %repo.id, "Operation not supported by provider");
                }
                ref other => {
                    tracing::error!(
                        operation,
                        repository = %repo.id,
                        error = %short_error_message(other),
                        "Operation failed, returning no results"
                    );
                }
            }
            Vec::new()
        }
    }
}

/// Turn a permission lookup result into a [`Permission`].
///
/// HTTP 403 becomes [`Permission::Denied`]; every other failure is logged and
/// becomes [`Permission::Unknown`].
pub fn permission_or_unknown<E>(
    repo: &Repository,
    login: &str,
    result: Result<String, E>,
) -> Permission
where
    E: Into<PlatformError>,
{
    match result {
        Ok(level) => Permission::Granted(level),
        Err(e) => {
            let err: PlatformError = e.into();
            if err.is_forbidden() {
                tracing::debug!(repository = %repo.id, user = login, "Permission lookup denied");
                return Permission::Denied;
            }
            let reason = short_error_message(&err);
            tracing::error!(
                operation = "get_collaborator_permission",
                repository = %repo.id,
                user = login,
                error = %reason,
                "Permission lookup failed"
            );
            Permission::Unknown(reason)
        }
    }
}
