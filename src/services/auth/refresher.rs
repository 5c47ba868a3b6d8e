use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{errors::read_with_deadline, refresh_token_matches, timestamp_to_utc, AuthError};
use crate::{
    config::AuthSettings,
    db::{session_store::SessionStore, user_repository::UserRepository},
    routes::auth::claims::{Claims, TokenUse},
    utils::jwt::TokenMaker,
};

#[derive(Debug, Clone, Serialize)]
pub struct RenewedAccess {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub session_id: Uuid,
}

/// Exchanges a refresh token for a new access token on the same session.
/// The refresh token itself is left untouched.
pub struct CredentialRefresher {
    tokens: Arc<dyn TokenMaker>,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserRepository>,
    settings: AuthSettings,
}

impl CredentialRefresher {
    pub fn new(
        tokens: Arc<dyn TokenMaker>,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            tokens,
            sessions,
            users,
            settings,
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RenewedAccess, AuthError> {
        let claims = self.tokens.decode(refresh_token)?;
        if claims.token_use != TokenUse::Refresh {
            return Err(AuthError::TokenUseMismatch);
        }

        let session = read_with_deadline(
            self.settings.store_timeout,
            "find_session",
            self.sessions.find_session(claims.session_id),
        )
        .await?
        .ok_or(AuthError::SessionNotFound)?;

        if !session.is_usable(Utc::now()) {
            if session.is_blocked {
                debug!(session_id = %session.id, "refresh attempted on revoked session");
                return Err(AuthError::SessionRevoked);
            }
            return Err(AuthError::SessionExpired);
        }
        if session.user_id != claims.subject_id
            || !refresh_token_matches(refresh_token, &session.refresh_token_hash)
        {
            return Err(AuthError::RefreshTokenMismatch);
        }

        // Role and email come from the account as it is now, not as it was at login.
        let user = read_with_deadline(
            self.settings.store_timeout,
            "find_user_by_id",
            self.users.find_user_by_id(session.user_id),
        )
        .await?
        .ok_or(AuthError::SessionNotFound)?;
        if !user.is_active() {
            return Err(AuthError::SessionRevoked);
        }

        let access = Claims::new(
            session.id,
            user.id,
            &user.email,
            user.role,
            TokenUse::Access,
            self.settings.access_token_ttl,
        );
        let access_token = self.tokens.encode(&access)?;

        info!(session_id = %session.id, user_id = %user.id, "access token renewed");

        Ok(RenewedAccess {
            access_token,
            access_token_expires_at: timestamp_to_utc(access.expires_at)?,
            session_id: session.id,
        })
    }
}
