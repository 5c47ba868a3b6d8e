use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{db::session_store::SessionStore, models::session::Session};

pub struct PostgresSessionStore {
    pub pool: PgPool,
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_session(&self, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions
                (id, user_id, user_agent, client_ip, refresh_token_hash, is_blocked, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.user_agent)
        .bind(&session.client_ip)
        .bind(&session.refresh_token_hash)
        .bind(session.is_blocked)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, user_id = %session.user_id, "Persisted session");
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, user_agent, client_ip, refresh_token_hash, is_blocked, expires_at, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn block_session(&self, session_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET is_blocked = TRUE WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn block_user_sessions(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_blocked = TRUE WHERE user_id = $1 AND is_blocked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_user_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, user_agent, client_ip, refresh_token_hash, is_blocked, expires_at, created_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!(deleted, "Purged expired sessions");
        }
        Ok(deleted)
    }
}
