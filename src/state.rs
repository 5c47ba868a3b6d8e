use std::sync::Arc;

use crate::config::Config;
use crate::db::{
    appointment_repository::AppointmentRepository, category_repository::CategoryRepository,
    session_store::SessionStore, user_repository::UserRepository,
};
use crate::services::auth::{CredentialIssuer, CredentialRefresher, SessionRevoker};
use crate::utils::jwt::{JwtMaker, TokenMaker};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub tokens: Arc<dyn TokenMaker>,
    pub issuer: Arc<CredentialIssuer>,
    pub refresher: Arc<CredentialRefresher>,
    pub revoker: Arc<SessionRevoker>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the credential services around one token maker and one session
    /// store, both built from `config`.
    pub fn new(
        config: Arc<Config>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let tokens: Arc<dyn TokenMaker> = Arc::new(JwtMaker::new(
            config.jwt_keys.clone(),
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        ));
        let settings = config.auth.clone();

        Self {
            issuer: Arc::new(CredentialIssuer::new(
                tokens.clone(),
                sessions.clone(),
                settings.clone(),
            )),
            refresher: Arc::new(CredentialRefresher::new(
                tokens.clone(),
                sessions.clone(),
                users.clone(),
                settings.clone(),
            )),
            revoker: Arc::new(SessionRevoker::new(sessions, settings)),
            db: users,
            categories,
            appointments,
            tokens,
            config,
        }
    }
}
