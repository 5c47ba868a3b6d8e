use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Signed payload of both access and refresh tokens. Never persisted; it only
/// exists inside a token string and is rebuilt by verification.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub session_id: Uuid,
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    pub email: String, // denormalized, the user record stays authoritative
    pub role: UserRole,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64, // UNIX timestamp, seconds
    pub iss: String,
    pub aud: String,
    pub token_use: TokenUse,
}

impl Claims {
    /// Builds a payload valid from now for `ttl`. `iss` and `aud` are left
    /// empty and stamped by the token maker on encode.
    pub fn new(
        session_id: Uuid,
        subject_id: Uuid,
        email: impl Into<String>,
        role: UserRole,
        token_use: TokenUse,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            subject_id,
            email: email.into(),
            role,
            issued_at: now.timestamp(),
            expires_at: (now + ttl).timestamp(),
            iss: String::new(),
            aud: String::new(),
            token_use,
        }
    }
}
