use std::{future::Future, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{db::is_transient, responses::JsonResponse, utils::jwt::TokenError};

/// Seconds clients are told to wait after a store deadline was missed.
const RETRY_AFTER_SECS: u64 = 1;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is malformed")]
    MalformedToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    ExpiredToken,
    #[error("token was presented for the wrong purpose")]
    TokenUseMismatch,
    #[error("session not found")]
    SessionNotFound,
    #[error("session has been revoked")]
    SessionRevoked,
    #[error("session has expired")]
    SessionExpired,
    #[error("refresh token does not match its session")]
    RefreshTokenMismatch,
    #[error("authentication required")]
    Unauthorized,
    #[error("insufficient role")]
    Forbidden,
    #[error("token could not be encoded")]
    Encoding,
    #[error("session could not be persisted")]
    SessionPersistence(#[source] sqlx::Error),
    #[error("session store unavailable")]
    StoreUnavailable,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Encoding | AuthError::SessionPersistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Encoding => AuthError::Encoding,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => {
                debug!(reason = %self, "rejecting unauthenticated request");
                JsonResponse::unauthorized("Unauthorized").into_response()
            }
            StatusCode::FORBIDDEN => JsonResponse::forbidden("Forbidden").into_response(),
            StatusCode::SERVICE_UNAVAILABLE => {
                warn!(error = %self, "auth request failed on store deadline");
                JsonResponse::service_unavailable(
                    "Service temporarily unavailable",
                    RETRY_AFTER_SECS,
                )
            }
            _ => {
                error!(error = ?self, "auth request failed");
                JsonResponse::server_error("Internal server error").into_response()
            }
        }
    }
}

/// Runs a session store read under `limit`. Any failure is reported as
/// `StoreUnavailable`.
pub(crate) async fn read_with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            error!(operation, ?err, "session store read failed");
            Err(AuthError::StoreUnavailable)
        }
        Err(_) => {
            warn!(operation, ?limit, "session store read timed out");
            Err(AuthError::StoreUnavailable)
        }
    }
}

/// Runs a session store write under `limit`. Timeouts and connection
/// problems are `StoreUnavailable`; anything else is `SessionPersistence`.
pub(crate) async fn write_with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) if is_transient(&err) => {
            warn!(operation, ?err, "session store write hit a connection problem");
            Err(AuthError::StoreUnavailable)
        }
        Ok(Err(err)) => Err(AuthError::SessionPersistence(err)),
        Err(_) => {
            warn!(operation, ?limit, "session store write timed out");
            Err(AuthError::StoreUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_and_session_failures_are_401() {
        for err in [
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::ExpiredToken,
            AuthError::TokenUseMismatch,
            AuthError::SessionNotFound,
            AuthError::SessionRevoked,
            AuthError::SessionExpired,
            AuthError::RefreshTokenMismatch,
            AuthError::Unauthorized,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err}");
        }
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn infrastructure_failures_hide_details() {
        let response =
            AuthError::SessionPersistence(sqlx::Error::Protocol("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("disk full"));
    }

    #[tokio::test]
    async fn store_unavailable_is_503_with_retry_hint() {
        assert!(AuthError::StoreUnavailable.is_retryable());
        let response = AuthError::StoreUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key("retry-after"));
    }

    #[tokio::test]
    async fn write_errors_are_classified() {
        let limit = Duration::from_millis(100);

        let err = write_with_deadline(limit, "test", async {
            Err::<(), _>(sqlx::Error::PoolTimedOut)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable));

        let err = write_with_deadline(limit, "test", async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::SessionPersistence(_)));
    }

    #[tokio::test]
    async fn slow_read_times_out() {
        let err = read_with_deadline(Duration::from_millis(10), "test", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable));
    }
}
