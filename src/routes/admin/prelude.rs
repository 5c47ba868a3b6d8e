pub(crate) use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
pub(crate) use serde_json::json;
pub(crate) use tracing::{error, info};
pub(crate) use uuid::Uuid;

pub(crate) use crate::{
    db::is_unique_violation, responses::JsonResponse, routes::auth::session::AuthSession,
    state::AppState,
};
