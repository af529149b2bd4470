use sqlx::error::{DatabaseError, ErrorKind};

use crate::DbError;

/// Uniqueness violation codes across the drivers we have run against:
/// Postgres `23505`, MySQL `1062`, SQLite extended codes `2067` (UNIQUE)
/// and `1555` (PRIMARY KEY).
const UNIQUE_VIOLATION_CODES: &[&str] = &["23505", "1062", "2067", "1555"];

/// Map a driver error onto the domain taxonomy. Total: anything not
/// recognised is `Internal`.
pub fn classify(err: &sqlx::Error) -> DbError {
    match err {
        sqlx::Error::RowNotFound => DbError::NotFound,
        sqlx::Error::Database(db) if is_unique_violation(db.as_ref()) => DbError::Conflict,
        _ => DbError::Internal,
    }
}

pub fn is_unique_violation_code(code: &str) -> bool {
    UNIQUE_VIOLATION_CODES.contains(&code)
}

fn is_unique_violation(db: &dyn DatabaseError) -> bool {
    matches!(db.kind(), ErrorKind::UniqueViolation)
        || db.code().is_some_and(|c| is_unique_violation_code(&c))
}

/// Classify and log. The raw driver error and statement text only ever
/// reach the log, never the caller.
pub(crate) fn fail(op: &'static str, sql: &str, err: sqlx::Error) -> DbError {
    let classified = classify(&err);
    tracing::error!(op, sql, error = %err, kind = %classified, "database call failed");
    classified
}
