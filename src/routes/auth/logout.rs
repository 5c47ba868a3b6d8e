use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{responses::JsonResponse, state::AppState};

use super::session::AuthSession;

/// Blocks the caller's own session. The access token in hand keeps working
/// until it expires; the refresh token stops working immediately.
pub async fn handle_logout(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    match app_state.revoker.revoke(claims.session_id).await {
        Ok(_) => JsonResponse::success("Logged out").into_response(),
        Err(err) => err.into_response(),
    }
}
