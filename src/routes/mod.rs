//! Route definitions and router assembly for the task manager API.

pub mod auth;
pub mod health;
pub mod labels;
pub mod task_statuses;
pub mod tasks;
pub mod users;

use std::fmt::Display;

use axum::{
    http::{header::HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::middleware::{auth::authenticate, error_capture};
use crate::AppState;

/// Response header carrying the unpaginated size of a list.
pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

pub fn total_count<N: Display>(n: N) -> [(HeaderName, String); 1] {
    [(TOTAL_COUNT, n.to_string())]
}

fn cors(frontend_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(frontend_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(frontend_url, "Invalid FRONTEND_URL, allowing any origin");
            AllowOrigin::any()
        }
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([TOTAL_COUNT])
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/login", post(auth::login))
        .route("/login/refresh", post(auth::refresh));

    let protected = Router::new()
        .route("/me", get(auth::me))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get_by_id).put(users::update).delete(users::delete),
        )
        .route(
            "/task_statuses",
            get(task_statuses::list).post(task_statuses::create),
        )
        .route(
            "/task_statuses/{id}",
            get(task_statuses::get_by_id)
                .put(task_statuses::update)
                .delete(task_statuses::delete),
        )
        .route("/labels", get(labels::list).post(labels::create))
        .route(
            "/labels/{id}",
            get(labels::get_by_id).put(labels::update).delete(labels::delete),
        )
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/{id}",
            get(tasks::get_by_id).put(tasks::update).delete(tasks::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", public.merge(protected))
        .layer(CatchPanicLayer::custom(error_capture::panic_response))
        .layer(middleware::from_fn_with_state(
            state.reporter.clone(),
            error_capture::capture_errors,
        ))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(cors(&state.config.frontend_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_live_is_public() {
        let app = router(test_state().await);
        let (status, _) = send(
            app,
            Request::builder().uri("/health/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        for (method, uri) in [
            ("GET", "/api/tasks"),
            ("GET", "/api/users/1"),
            ("POST", "/api/labels"),
            ("DELETE", "/api/task_statuses/1"),
            ("GET", "/api/me"),
        ] {
            let app = router(test_state().await);
            let (status, body) = send(
                app,
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn missing_token_wins_over_bad_body() {
        let app = router(test_state().await);
        let (status, _) = send(
            app,
            Request::builder()
                .method("POST")
                .uri("/api/tasks")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let app = router(test_state().await);
        let (status, body) = send(
            app,
            Request::builder()
                .uri("/api/tasks")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Authentication required");
    }

    #[tokio::test]
    async fn login_with_seeded_admin() {
        let app = router(test_state().await);
        let (status, body) = send(
            app,
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"username": "hexlet@example.com", "password": "qwerty"}"#,
                ))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["access_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn list_exposes_total_count() {
        let state = test_state().await;
        let token = crate::test_support::admin_token(&state).await;
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/task_statuses")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[TOTAL_COUNT], "5");
    }

    async fn get_with(state: AppState, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
        send(
            router(state),
            Request::builder()
                .uri(uri)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn me_requires_read_scope() {
        let state = test_state().await;
        let now = chrono::Utc::now().timestamp();
        let claims = crate::services::auth::Claims {
            sub: state.config.bootstrap.admin_email.clone(),
            user_id: 1,
            iss: state.config.jwt.issuer.clone(),
            aud: None,
            scope: String::new(),
            token_type: "access".to_string(),
            exp: now + 600,
            iat: now,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        )
        .unwrap();

        let (status, body) = get_with(state.clone(), "/api/me", &token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["data"].is_null());

        let admin = crate::test_support::admin_token(&state).await;
        let (status, body) = get_with(state, "/api/me", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "hexlet@example.com");
    }

    #[tokio::test]
    async fn malformed_path_and_query_use_the_envelope() {
        let state = test_state().await;
        let token = crate::test_support::admin_token(&state).await;

        for (uri, field) in [
            ("/api/tasks/abc", "path"),
            ("/api/users/1.5", "path"),
            ("/api/tasks?assigneeId=abc", "query"),
            ("/api/tasks?page=first", "query"),
        ] {
            let (status, body) = get_with(state.clone(), uri, &token).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
            assert_eq!(body["error"]["details"][0]["field"], field, "{uri}");
        }
    }

    #[tokio::test]
    async fn extreme_page_numbers_return_empty_pages() {
        let state = test_state().await;
        let token = crate::test_support::admin_token(&state).await;

        for uri in [
            "/api/tasks?page=9223372036854775807",
            "/api/tasks?page=-9223372036854775808&per_page=9223372036854775807",
            "/api/tasks?_start=9223372036854775807&_end=9223372036854775807",
            "/api/tasks?_start=1&_end=-9223372036854775808",
        ] {
            let (status, body) = get_with(state.clone(), uri, &token).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["data"]["items"], serde_json::json!([]), "{uri}");
        }
    }
}
