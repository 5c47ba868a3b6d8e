pub mod admin;
pub mod auth;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{
    routes::auth::{handle_login, handle_logout, handle_me, handle_refresh, session::require_auth},
    state::AppState,
};

/// Login and token renewal: the only routes reachable without a token.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handle_login))
        .route("/tokens/renew_access", post(handle_refresh))
}

/// Routes behind the authentication gate, admin routes included.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handle_me))
        .route("/logout", post(handle_logout))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
        .nest("/admin", admin::routes(state))
}

/// The whole `/api` surface with state applied and no transport layers.
pub fn api_router(state: AppState) -> Router {
    let api = credential_routes().merge(protected_routes(state.clone()));
    Router::new().nest("/api", api).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        db::mock_db::{test_user, MockDb},
        models::user::UserRole,
        state::test_state,
    };

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn login_me_forbidden_expiry_and_refresh() {
        let user = test_user("ana@example.com", "password123", UserRole::User);
        let mut config = Config::for_tests();
        config.auth.access_token_ttl = Duration::seconds(3);
        let (state, _, _) = test_state::build_with_config(MockDb::with_users(vec![user]), config);
        let router = api_router(state.clone());

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/login",
                json!({ "email": "ana@example.com", "password": "password123" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login = json_body(response).await;
        let access = login["access_token"].as_str().unwrap().to_string();
        let refresh = login["refresh_token"].as_str().unwrap().to_string();
        let session_id = login["session_id"].clone();

        let response = router
            .clone()
            .oneshot(bearer_request("GET", "/api/me", &access))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["user"]["email"], "ana@example.com");

        let response = router
            .clone()
            .oneshot(bearer_request("GET", "/api/admin/categories", &access))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        tokio::time::sleep(StdDuration::from_millis(4100)).await;

        let response = router
            .clone()
            .oneshot(bearer_request("GET", "/api/me", &access))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/tokens/renew_access",
                json!({ "refresh_token": refresh }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let renewed = json_body(response).await;
        let new_access = renewed["access_token"].as_str().unwrap();

        let claims = state.tokens.decode(new_access).unwrap();
        assert_eq!(json!(claims.session_id), session_id);

        let response = router
            .oneshot(bearer_request("GET", "/api/me", new_access))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_blocks_refresh_for_that_session_only() {
        let user = test_user("ana@example.com", "password123", UserRole::User);
        let (state, _, _) = test_state::build(MockDb::with_users(vec![user]));
        let router = api_router(state);
        let credentials = json!({ "email": "ana@example.com", "password": "password123" });

        let mut logins = Vec::new();
        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(json_request("/api/login", credentials.clone()))
                .await
                .unwrap();
            logins.push(json_body(response).await);
        }
        let token_of = |i: usize, key: &str| logins[i][key].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(bearer_request("POST", "/api/logout", &token_of(0, "access_token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/tokens/renew_access",
                json!({ "refresh_token": token_of(0, "refresh_token") }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(json_request(
                "/api/tokens/renew_access",
                json!({ "refresh_token": token_of(1, "refresh_token") }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn access_token_is_refused_by_renew_endpoint() {
        let user = test_user("ana@example.com", "password123", UserRole::User);
        let (state, _, _) = test_state::build(MockDb::with_users(vec![user]));
        let router = api_router(state);

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/login",
                json!({ "email": "ana@example.com", "password": "password123" }),
            ))
            .await
            .unwrap();
        let access = json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = router
            .oneshot(json_request(
                "/api/tokens/renew_access",
                json!({ "refresh_token": access }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Unauthorized");
    }
}
