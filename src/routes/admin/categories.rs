use super::prelude::*;
use crate::models::category::CategoryPayload;

fn validate(payload: &CategoryPayload) -> Option<Response> {
    if payload.name.trim().is_empty() {
        return Some(JsonResponse::bad_request("Category name is required").into_response());
    }
    None
}

pub async fn list_categories(State(app_state): State<AppState>) -> Response {
    match app_state.categories.list_categories().await {
        Ok(categories) => Json(json!({ "success": true, "categories": categories })).into_response(),
        Err(err) => {
            error!(?err, "failed to list categories");
            JsonResponse::server_error("Failed to list categories").into_response()
        }
    }
}

pub async fn get_category(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match app_state.categories.find_category(id).await {
        Ok(Some(category)) => Json(json!({ "success": true, "category": category })).into_response(),
        Ok(None) => JsonResponse::not_found("Category not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to load category");
            JsonResponse::server_error("Failed to load category").into_response()
        }
    }
}

pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    if let Some(rejection) = validate(&payload) {
        return rejection;
    }

    match app_state.categories.create_category(&payload).await {
        Ok(category) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "category": category })),
        )
            .into_response(),
        Err(err) if is_unique_violation(&err) => {
            JsonResponse::conflict("A category with this name already exists").into_response()
        }
        Err(err) => {
            error!(?err, "failed to create category");
            JsonResponse::server_error("Failed to create category").into_response()
        }
    }
}

pub async fn update_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    if let Some(rejection) = validate(&payload) {
        return rejection;
    }

    match app_state.categories.update_category(id, &payload).await {
        Ok(Some(category)) => Json(json!({ "success": true, "category": category })).into_response(),
        Ok(None) => JsonResponse::not_found("Category not found").into_response(),
        Err(err) if is_unique_violation(&err) => {
            JsonResponse::conflict("A category with this name already exists").into_response()
        }
        Err(err) => {
            error!(?err, %id, "failed to update category");
            JsonResponse::server_error("Failed to update category").into_response()
        }
    }
}

pub async fn delete_category(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match app_state.categories.delete_category(id).await {
        Ok(true) => JsonResponse::success("Category deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Category not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to delete category");
            JsonResponse::server_error("Failed to delete category").into_response()
        }
    }
}
