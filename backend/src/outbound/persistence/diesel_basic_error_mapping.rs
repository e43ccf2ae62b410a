//! Diesel and pool error mapping shared by both repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowConversionError;
use super::pool::PoolError;

/// Constructors a repository error type offers for connection and query
/// failures.
pub(crate) trait BasicRepositoryError: Sized {
    fn connection_failure(message: String) -> Self;
    fn query_failure(message: String) -> Self;
}

/// Map a pool failure to the repository's connection variant.
pub(crate) fn map_pool_error<E: BasicRepositoryError>(error: PoolError) -> E {
    E::connection_failure(error.into_message())
}

/// Map a Diesel failure, keeping the driver message.
///
/// Closed connections become connection failures; everything else is a
/// query failure.
pub(crate) fn map_diesel_error<E: BasicRepositoryError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            E::connection_failure(info.message().to_owned())
        }
        other => E::query_failure(other.to_string()),
    }
}

/// Map a row that could not be converted into a domain value.
pub(crate) fn map_row_error<E: BasicRepositoryError>(error: RowConversionError) -> E {
    E::query_failure(error.to_string())
}
