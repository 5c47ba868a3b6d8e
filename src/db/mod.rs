pub mod appointment_repository;
pub mod category_repository;
pub mod memory_session_store;
#[cfg(test)]
pub mod mock_db;
pub mod postgres_appointment_repository;
pub mod postgres_category_repository;
pub mod postgres_session_store;
pub mod postgres_user_repository;
pub mod session_store;
pub mod user_repository;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code == "23505";
        }
    }
    false
}

/// Errors worth retrying: the pool or the connection, not the query.
pub(crate) fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}
