use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    responses::JsonResponse,
    state::AppState,
    utils::{
        ip::ClientContext,
        password::{verify_password, verify_password_without_account},
    },
};

use super::session::AuthSession;

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn handle_login(
    State(app_state): State<AppState>,
    client: ClientContext,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return JsonResponse::bad_request("Email and password are required").into_response();
    }

    let user = match app_state.db.find_user_by_email(email).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            // Unknown emails pay the same hashing cost as a wrong password.
            verify_password_without_account(&payload.password);
            return JsonResponse::unauthorized("Invalid credentials").into_response();
        }
        Err(err) => {
            error!(?err, "failed to load user during login");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return JsonResponse::unauthorized("Invalid credentials").into_response(),
        Err(err) => {
            error!(?err, user_id = %user.id, "stored password hash is unreadable");
            return JsonResponse::server_error("Internal error").into_response();
        }
    }

    // Inactive accounts get the same answer as a wrong password.
    if !user.is_active() {
        info!(user_id = %user.id, "login refused for inactive account");
        return JsonResponse::unauthorized("Invalid credentials").into_response();
    }

    let pair = match app_state.issuer.issue(&user, &client).await {
        Ok(pair) => pair,
        Err(err) => return err.into_response(),
    };

    Json(json!({
        "success": true,
        "session_id": pair.session_id,
        "access_token": pair.access_token,
        "access_token_expires_at": pair.access_token_expires_at,
        "refresh_token": pair.refresh_token,
        "refresh_token_expires_at": pair.refresh_token_expires_at,
        "user": user,
    }))
    .into_response()
}

pub async fn handle_me(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    match app_state.db.find_user_by_id(claims.subject_id).await {
        Ok(Some(user)) => Json(json!({
            "success": true,
            "user": user,
            "session_id": claims.session_id,
        }))
        .into_response(),
        Ok(None) => JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, user_id = %claims.subject_id, "failed to load current user");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
