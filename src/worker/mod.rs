use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{task::JoinHandle, time::interval};
use tracing::{error, info};

use crate::db::session_store::SessionStore;

/// Deletes sessions past their own expiry once per `every`. Blocked sessions
/// that have not expired yet are kept so admins can still see them.
pub fn start_session_cleanup(sessions: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            purge_once(sessions.as_ref()).await;
        }
    })
}

async fn purge_once(sessions: &dyn SessionStore) -> u64 {
    match sessions.purge_expired(Utc::now()).await {
        Ok(0) => 0,
        Ok(purged) => {
            info!(purged, "expired sessions purged");
            purged
        }
        Err(err) => {
            error!(?err, "session cleanup failed");
            0
        }
    }
}
