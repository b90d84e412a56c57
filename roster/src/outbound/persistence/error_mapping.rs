//! Shared Diesel error mapping for repositories with basic query semantics.

use tracing::debug;

use super::session::SessionError;

/// Map session checkout errors into a repository-specific connection error
/// constructor.
pub(crate) fn map_session_error<E, C>(error: SessionError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.to_string())
}

/// Map common Diesel error variants into query/connection/duplicate
/// constructors.
///
/// This helper captures the repeated mapping used by the adapters:
/// `NotFound` and query-builder failures map to query errors, unique
/// constraint violations map through `duplicate`, and closed connections
/// map to connection errors.
pub(crate) fn map_diesel_error<E, Q, C, D>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
    duplicate: D,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    D: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            duplicate(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}
