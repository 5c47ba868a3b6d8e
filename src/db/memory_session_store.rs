use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::{db::session_store::SessionStore, models::session::Session};

/// Session store kept in process memory. Used for tests and for
/// `SESSION_BACKEND=memory`; sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<(), sqlx::Error> {
        match self.sessions.entry(session.id) {
            Entry::Occupied(_) => Err(sqlx::Error::Protocol(format!(
                "session {} already exists",
                session.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn find_session(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        Ok(self.sessions.get(&session_id).map(|entry| entry.clone()))
    }

    async fn block_session(&self, session_id: Uuid) -> Result<bool, sqlx::Error> {
        match self.sessions.get_mut(&session_id) {
            Some(mut entry) => {
                entry.is_blocked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn block_user_sessions(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let mut blocked = 0;
        for mut entry in self.sessions.iter_mut() {
            if entry.user_id == user_id && !entry.is_blocked {
                entry.is_blocked = true;
                blocked += 1;
            }
        }
        Ok(blocked)
    }

    async fn list_user_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, sqlx::Error> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - self.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(user_id: Uuid, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id,
            user_agent: "agent".into(),
            client_ip: "10.0.0.1".into(),
            refresh_token_hash: "hash".into(),
            is_blocked: false,
            expires_at: now + expires_in,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_ids() {
        let store = InMemorySessionStore::new();
        let s = session(Uuid::new_v4(), Duration::hours(1));

        store.create_session(&s).await.unwrap();
        assert!(store.create_session(&s).await.is_err());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn block_session_flips_only_that_session() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let first = session(user_id, Duration::hours(1));
        let second = session(user_id, Duration::hours(1));
        store.create_session(&first).await.unwrap();
        store.create_session(&second).await.unwrap();

        assert!(store.block_session(first.id).await.unwrap());
        assert!(!store.block_session(Uuid::new_v4()).await.unwrap());

        assert!(store.find_session(first.id).await.unwrap().unwrap().is_blocked);
        assert!(!store.find_session(second.id).await.unwrap().unwrap().is_blocked);
    }

    #[tokio::test]
    async fn block_user_sessions_counts_newly_blocked() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let other_user = session(Uuid::new_v4(), Duration::hours(1));
        let already_blocked = session(user_id, Duration::hours(1));
        store.create_session(&session(user_id, Duration::hours(1))).await.unwrap();
        store.create_session(&already_blocked).await.unwrap();
        store.create_session(&other_user).await.unwrap();
        store.block_session(already_blocked.id).await.unwrap();

        assert_eq!(store.block_user_sessions(user_id).await.unwrap(), 1);
        assert!(!store.find_session(other_user.id).await.unwrap().unwrap().is_blocked);
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let live = session(user_id, Duration::hours(1));
        store.create_session(&live).await.unwrap();
        store.create_session(&session(user_id, Duration::seconds(-5))).await.unwrap();

        assert_eq!(store.purge_expired(Utc::now()).await.unwrap(), 1);
        assert_eq!(store.list_user_sessions(user_id).await.unwrap(), vec![live]);
    }
}
