//! Shared Diesel error mapping for the marketplace repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constraint failures that repositories translate into domain variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Violation<'a> {
    /// Unique constraint, with the constraint name when reported.
    Unique(Option<&'a str>),
    /// Foreign key constraint, with the constraint name when reported.
    ForeignKey(Option<&'a str>),
    /// `CHECK` constraint, with the constraint name when reported.
    Check(Option<&'a str>),
    /// Value outside a `NUMERIC` column's precision.
    NumericOverflow,
}

/// Classify constraint failures reported by PostgreSQL.
pub(super) fn classify_violation(error: &DieselError) -> Option<Violation<'_>> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(Violation::Unique(info.constraint_name())),
        DatabaseErrorKind::ForeignKeyViolation => {
            Some(Violation::ForeignKey(info.constraint_name()))
        }
        DatabaseErrorKind::CheckViolation => Some(Violation::Check(info.constraint_name())),
        _ if info.message().contains("numeric field overflow") => Some(Violation::NumericOverflow),
        _ => None,
    }
}

/// Map the remaining Diesel error variants into query/connection
/// constructors. Callers handle [`Violation`]s they care about first.
pub(super) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
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
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::DatabaseError(DatabaseErrorKind::UnableToSendCommand, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("transaction serialisation failure")
        }
        _ => query("database error"),
    }
}
