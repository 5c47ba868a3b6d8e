use super::prelude::*;

pub async fn list_user_sessions(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Response {
    match app_state.revoker.list_for_user(user_id).await {
        Ok(sessions) => Json(json!({ "success": true, "sessions": sessions })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn revoke_session(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(session_id): Path<Uuid>,
) -> Response {
    match app_state.revoker.revoke(session_id).await {
        Ok(true) => {
            info!(%session_id, revoked_by = %claims.subject_id, "session revoked by admin");
            JsonResponse::success("Session revoked").into_response()
        }
        Ok(false) => JsonResponse::not_found("Session not found").into_response(),
        Err(err) => err.into_response(),
    }
}
