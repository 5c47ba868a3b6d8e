use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{
    errors::{read_with_deadline, write_with_deadline},
    AuthError,
};
use crate::{config::AuthSettings, db::session_store::SessionStore, models::session::Session};

/// Logout and admin revocation. Blocking is one-way; a blocked session stays
/// on record until retention cleanup removes it.
pub struct SessionRevoker {
    sessions: Arc<dyn SessionStore>,
    settings: AuthSettings,
}

impl SessionRevoker {
    pub fn new(sessions: Arc<dyn SessionStore>, settings: AuthSettings) -> Self {
        Self { sessions, settings }
    }

    /// Returns `false` when no such session exists.
    pub async fn revoke(&self, session_id: Uuid) -> Result<bool, AuthError> {
        let found = write_with_deadline(
            self.settings.store_timeout,
            "block_session",
            self.sessions.block_session(session_id),
        )
        .await?;
        if found {
            info!(%session_id, "session revoked");
        }
        Ok(found)
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let blocked = write_with_deadline(
            self.settings.store_timeout,
            "block_user_sessions",
            self.sessions.block_user_sessions(user_id),
        )
        .await?;
        info!(%user_id, blocked, "user sessions revoked");
        Ok(blocked)
    }

    pub async fn find(&self, session_id: Uuid) -> Result<Option<Session>, AuthError> {
        read_with_deadline(
            self.settings.store_timeout,
            "find_session",
            self.sessions.find_session(session_id),
        )
        .await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError> {
        read_with_deadline(
            self.settings.store_timeout,
            "list_user_sessions",
            self.sessions.list_user_sessions(user_id),
        )
        .await
    }
}
