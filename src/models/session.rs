use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One login. The only field that ever changes after insert is `is_blocked`,
/// and it only goes from `false` to `true`.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_agent: String,
    pub client_ip: String,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A session can be redeemed for new access tokens only while it is
    /// neither blocked nor past its own expiry.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_blocked && !self.is_expired(now)
    }
}
