use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

use crate::{
    models::user::UserRole,
    routes::auth::claims::{Claims, TokenUse},
    services::auth::AuthError,
    state::AppState,
};

/// Verified access claims of the caller. Only available behind `require_auth`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession(pub Claims);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthSession)
            .ok_or(AuthError::Unauthorized)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Authentication gate. Stops the request unless it carries a valid access
/// token, then hands the claims to everything behind it.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::Unauthorized)?;

    let claims = state.tokens.decode(&token).map_err(|err| {
        debug!(?err, "access token rejected");
        AuthError::Unauthorized
    })?;
    if claims.token_use != TokenUse::Access {
        return Err(AuthError::TokenUseMismatch);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn require_role(req: &Request, allowed: fn(UserRole) -> bool) -> Result<(), AuthError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::Unauthorized)?;
    if !allowed(claims.role) {
        debug!(session_id = %claims.session_id, role = %claims.role, "role check failed");
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

/// Role gate for `/admin`. Must sit behind `require_auth`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    require_role(&req, UserRole::is_admin)?;
    Ok(next.run(req).await)
}

pub async fn require_superadmin(req: Request, next: Next) -> Result<Response, AuthError> {
    require_role(&req, |role| role == UserRole::Superadmin)?;
    Ok(next.run(req).await)
}
