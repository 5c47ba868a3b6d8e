use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{responses::JsonResponse, state::AppState};

#[derive(Deserialize)]
pub struct RenewAccessPayload {
    pub refresh_token: String,
}

pub async fn handle_refresh(
    State(app_state): State<AppState>,
    Json(payload): Json<RenewAccessPayload>,
) -> Response {
    let token = payload.refresh_token.trim();
    if token.is_empty() {
        return JsonResponse::bad_request("refresh_token is required").into_response();
    }

    match app_state.refresher.refresh(token).await {
        Ok(renewed) => Json(json!({
            "success": true,
            "access_token": renewed.access_token,
            "access_token_expires_at": renewed.access_token_expires_at,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
