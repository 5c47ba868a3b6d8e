use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
}

impl JsonResponse {
    fn error(status: StatusCode, msg: &str) -> (StatusCode, Json<JsonResponse>) {
        (
            status,
            Json(JsonResponse {
                status: "error".to_string(),
                success: false,
                message: msg.to_string(),
                code: None,
            }),
        )
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                status: "success".to_string(),
                success: true,
                message: msg.to_string(),
                code: None,
            }),
        )
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::CONFLICT, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::BAD_REQUEST, msg)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::TOO_MANY_REQUESTS, msg)
    }

    pub fn forbidden(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::FORBIDDEN, msg)
    }

    /// 503 with a `Retry-After` hint; used when a store call missed its deadline.
    pub fn service_unavailable(msg: &str, retry_after_secs: u64) -> Response {
        let mut response = Self::error(StatusCode::SERVICE_UNAVAILABLE, msg).into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use serde_json::from_slice;

    use crate::responses::JsonResponse;

    #[tokio::test]
    async fn test_success_response() {
        let resp = JsonResponse::success("ok").into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: JsonResponse = from_slice(&body).unwrap();
        assert_eq!(json.status, "success");
        assert!(json.success);
        assert_eq!(json.message, "ok");
    }

    #[tokio::test]
    async fn test_forbidden_response() {
        let resp = JsonResponse::forbidden("nope").into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let json: JsonResponse = from_slice(&body).unwrap();
        assert_eq!(json.status, "error");
        assert!(!json.success);
        assert_eq!(json.message, "nope");
    }

    #[tokio::test]
    async fn test_service_unavailable_sets_retry_after() {
        let resp = JsonResponse::service_unavailable("busy", 2);
        assert_eq!(
            resp.status(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(resp.headers().get("retry-after").unwrap(), "2");
    }
}
