use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::session::Session;

/// Owns every `Session` record. Implementations must make `create_session`
/// and the `is_blocked` flips atomic per record; nothing here needs
/// multi-record transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts a new session. Fails if the id already exists.
    async fn create_session(&self, session: &Session) -> Result<(), sqlx::Error>;
    async fn find_session(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error>;
    /// Returns whether a session with this id exists.
    async fn block_session(&self, session_id: Uuid) -> Result<bool, sqlx::Error>;
    /// Blocks every still-open session of a user, returning how many flipped.
    async fn block_user_sessions(&self, user_id: Uuid) -> Result<u64, sqlx::Error>;
    async fn list_user_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, sqlx::Error>;
    /// Retention cleanup: drops sessions whose own expiry is at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}
