use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{errors::write_with_deadline, hash_refresh_token, timestamp_to_utc, AuthError};
use crate::{
    config::AuthSettings,
    db::session_store::SessionStore,
    models::{session::Session, user::User},
    routes::auth::claims::{Claims, TokenUse},
    utils::{ip::ClientContext, jwt::TokenMaker},
};

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Turns a verified login into a persisted session plus the token pair bound
/// to it.
pub struct CredentialIssuer {
    tokens: Arc<dyn TokenMaker>,
    sessions: Arc<dyn SessionStore>,
    settings: AuthSettings,
}

impl CredentialIssuer {
    pub fn new(
        tokens: Arc<dyn TokenMaker>,
        sessions: Arc<dyn SessionStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            tokens,
            sessions,
            settings,
        }
    }

    /// Every call opens a new session; existing sessions of the user are left
    /// alone. No tokens are returned unless the session write succeeded.
    pub async fn issue(&self, user: &User, client: &ClientContext) -> Result<TokenPair, AuthError> {
        let session_id = Uuid::new_v4();

        let access = Claims::new(
            session_id,
            user.id,
            &user.email,
            user.role,
            TokenUse::Access,
            self.settings.access_token_ttl,
        );
        let refresh = Claims::new(
            session_id,
            user.id,
            &user.email,
            user.role,
            TokenUse::Refresh,
            self.settings.refresh_token_ttl,
        );

        let access_token = self.tokens.encode(&access)?;
        let refresh_token = self.tokens.encode(&refresh)?;
        let access_token_expires_at = timestamp_to_utc(access.expires_at)?;
        let refresh_token_expires_at = timestamp_to_utc(refresh.expires_at)?;

        let session = Session {
            id: session_id,
            user_id: user.id,
            user_agent: client.user_agent.clone(),
            client_ip: client.client_ip.clone(),
            refresh_token_hash: hash_refresh_token(&refresh_token),
            is_blocked: false,
            expires_at: refresh_token_expires_at,
            created_at: timestamp_to_utc(refresh.issued_at)?,
        };

        write_with_deadline(
            self.settings.store_timeout,
            "create_session",
            self.sessions.create_session(&session),
        )
        .await?;

        info!(%session_id, user_id = %user.id, role = %user.role, "session created");

        Ok(TokenPair {
            session_id,
            access_token,
            access_token_expires_at,
            refresh_token,
            refresh_token_expires_at,
        })
    }
}
