use super::prelude::*;
use crate::models::appointment::AppointmentPayload;

/// Field checks plus existence of both referenced users.
async fn validate(app_state: &AppState, payload: &AppointmentPayload) -> Option<Response> {
    if payload.duration <= 0 {
        return Some(JsonResponse::bad_request("Duration must be positive").into_response());
    }
    if payload.address.trim().is_empty() {
        return Some(JsonResponse::bad_request("Address is required").into_response());
    }
    if payload.status.trim().is_empty() {
        return Some(JsonResponse::bad_request("Status is required").into_response());
    }

    for user_id in [payload.created_by, payload.helper] {
        match app_state.db.find_user_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Some(
                    JsonResponse::bad_request(&format!("User {user_id} does not exist"))
                        .into_response(),
                )
            }
            Err(err) => {
                error!(?err, %user_id, "failed to check appointment participant");
                return Some(
                    JsonResponse::server_error("Failed to validate appointment").into_response(),
                );
            }
        }
    }
    None
}

pub async fn list_appointments(State(app_state): State<AppState>) -> Response {
    match app_state.appointments.list_appointments().await {
        Ok(appointments) => {
            Json(json!({ "success": true, "appointments": appointments })).into_response()
        }
        Err(err) => {
            error!(?err, "failed to list appointments");
            JsonResponse::server_error("Failed to list appointments").into_response()
        }
    }
}

pub async fn get_appointment(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match app_state.appointments.find_appointment(id).await {
        Ok(Some(appointment)) => {
            Json(json!({ "success": true, "appointment": appointment })).into_response()
        }
        Ok(None) => JsonResponse::not_found("Appointment not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to load appointment");
            JsonResponse::server_error("Failed to load appointment").into_response()
        }
    }
}

pub async fn create_appointment(
    State(app_state): State<AppState>,
    Json(payload): Json<AppointmentPayload>,
) -> Response {
    if let Some(rejection) = validate(&app_state, &payload).await {
        return rejection;
    }

    match app_state.appointments.create_appointment(&payload).await {
        Ok(appointment) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "appointment": appointment })),
        )
            .into_response(),
        Err(err) => {
            error!(?err, "failed to create appointment");
            JsonResponse::server_error("Failed to create appointment").into_response()
        }
    }
}

pub async fn update_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentPayload>,
) -> Response {
    if let Some(rejection) = validate(&app_state, &payload).await {
        return rejection;
    }

    match app_state.appointments.update_appointment(id, &payload).await {
        Ok(Some(appointment)) => {
            Json(json!({ "success": true, "appointment": appointment })).into_response()
        }
        Ok(None) => JsonResponse::not_found("Appointment not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to update appointment");
            JsonResponse::server_error("Failed to update appointment").into_response()
        }
    }
}

pub async fn delete_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match app_state.appointments.delete_appointment(id).await {
        Ok(true) => JsonResponse::success("Appointment deleted").into_response(),
        Ok(false) => JsonResponse::not_found("Appointment not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to delete appointment");
            JsonResponse::server_error("Failed to delete appointment").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        db::mock_db::{test_user, MockDb},
        models::user::UserRole,
        routes::{admin::tests::admin_token, api_router},
        state::test_state,
    };

    fn post(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn payload(created_by: Uuid, helper: Uuid, duration: i64) -> Value {
        json!({
            "date": "2030-01-15T10:00:00Z",
            "duration": duration,
            "address": "18 de Julio 1234",
            "status": "pending",
            "created_by": created_by,
            "helper": helper,
        })
    }

    #[tokio::test]
    async fn creates_appointment_between_existing_users() {
        let requester = test_user("req@example.com", "password123", UserRole::User);
        let helper = test_user("help@example.com", "password123", UserRole::User);
        let (state, db, _) =
            test_state::build(MockDb::with_users(vec![requester.clone(), helper.clone()]));
        let token = admin_token(&state, UserRole::Admin);

        let response = api_router(state)
            .oneshot(post(
                "/api/admin/appointments",
                &token,
                payload(requester.id, helper.id, 3600),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["appointment"]["duration"], 3600);
        assert_eq!(db.appointments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_helper_and_bad_duration() {
        let requester = test_user("req@example.com", "password123", UserRole::User);
        let (state, db, _) = test_state::build(MockDb::with_users(vec![requester.clone()]));
        let token = admin_token(&state, UserRole::Admin);
        let router = api_router(state);

        for body in [
            payload(requester.id, Uuid::new_v4(), 3600),
            payload(requester.id, requester.id, 0),
        ] {
            let response = router
                .clone()
                .oneshot(post("/api/admin/appointments", &token, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(db.appointments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_appointment_is_404() {
        let (state, _, _) = test_state::build(MockDb::default());
        let token = admin_token(&state, UserRole::Admin);

        let response = api_router(state)
            .oneshot(
                Request::builder()
                    .uri(format!("/api/admin/appointments/{}", Uuid::new_v4()))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
