use std::{env, net::SocketAddr, str::FromStr, time::Duration as StdDuration};

use chrono::Duration;
use thiserror::Error;

use crate::utils::jwt::{JwtKeys, JwtSecretError};

const DEFAULT_JWT_ISSUER: &str = "admin-backend";
const DEFAULT_JWT_AUDIENCE: &str = "admin-backend-clients";
/// One day.
const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// One year.
const MAX_REFRESH_TOKEN_TTL_HOURS: i64 = 365 * 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    JwtSecret(#[from] JwtSecretError),
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Postgres,
    Memory,
}

impl FromStr for SessionBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(SessionBackend::Postgres),
            "memory" => Ok(SessionBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Lifetimes and deadlines used by the credential services.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Upper bound for every session store call made while issuing,
    /// refreshing or revoking credentials.
    pub store_timeout: StdDuration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::hours(168),
            store_timeout: StdDuration::from_millis(3000),
        }
    }
}

/// Process-wide settings, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub jwt_keys: JwtKeys,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub auth: AuthSettings,
    pub session_backend: SessionBackend,
    pub session_cleanup_interval: StdDuration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let jwt_keys = JwtKeys::from_env()?;
        let session_backend = match env::var("SESSION_BACKEND") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "SESSION_BACKEND",
                value,
            })?,
            Err(_) => SessionBackend::Postgres,
        };

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
            })?;

        let defaults = AuthSettings::default();
        let access_minutes = parse_var(
            "ACCESS_TOKEN_TTL_MINUTES",
            defaults.access_token_ttl.num_minutes(),
        )?;
        let refresh_hours = parse_var(
            "REFRESH_TOKEN_TTL_HOURS",
            defaults.refresh_token_ttl.num_hours(),
        )?;
        let (access_token_ttl, refresh_token_ttl) = token_ttls(access_minutes, refresh_hours)?;

        let store_timeout_ms: u64 = parse_var("STORE_TIMEOUT_MS", 3000)?;
        let cleanup_seconds: u64 = parse_var("SESSION_CLEANUP_INTERVAL_SECONDS", 3600)?;

        Ok(Config {
            database_url,
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8080)))?,
            jwt_keys,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_JWT_AUDIENCE.to_string()),
            auth: AuthSettings {
                access_token_ttl,
                refresh_token_ttl,
                store_timeout: StdDuration::from_millis(store_timeout_ms),
            },
            session_backend,
            session_cleanup_interval: StdDuration::from_secs(cleanup_seconds.max(1)),
        })
    }

    /// Settings for tests: in-memory sessions and a fixed signing secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/admin_backend_test".into(),
            frontend_origin: "http://localhost".into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_keys: JwtKeys::from_secret("0123456789abcdef0123456789abcdef")
                .expect("test JWT secret should be valid"),
            jwt_issuer: "test-issuer".into(),
            jwt_audience: "test-audience".into(),
            auth: AuthSettings::default(),
            session_backend: SessionBackend::Memory,
            session_cleanup_interval: StdDuration::from_secs(3600),
        }
    }
}

/// Turns the configured TTLs into durations. Both must be positive and
/// capped, and the refresh TTL must outlive the access TTL.
fn token_ttls(access_minutes: i64, refresh_hours: i64) -> Result<(Duration, Duration), ConfigError> {
    let access_token_ttl = Some(access_minutes)
        .filter(|m| (1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(m))
        .and_then(Duration::try_minutes)
        .ok_or_else(|| ConfigError::Invalid {
            name: "ACCESS_TOKEN_TTL_MINUTES",
            value: access_minutes.to_string(),
        })?;
    let refresh_token_ttl = Some(refresh_hours)
        .filter(|h| (1..=MAX_REFRESH_TOKEN_TTL_HOURS).contains(h))
        .and_then(Duration::try_hours)
        .filter(|ttl| *ttl > access_token_ttl)
        .ok_or_else(|| ConfigError::Invalid {
            name: "REFRESH_TOKEN_TTL_HOURS",
            value: refresh_hours.to_string(),
        })?;
    Ok((access_token_ttl, refresh_token_ttl))
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
