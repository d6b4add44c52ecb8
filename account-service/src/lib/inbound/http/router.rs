use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::register::create_user;
use super::handlers::register::register;
use super::handlers::update_user::delete_user;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    auth_service: Arc<dyn AuthServicePort>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        auth_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth", post(create_user));

    let protected_routes = Router::new()
        .route("/api/auth", get(list_users))
        .route(
            "/api/auth/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry bearer tokens.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use auth::HashingParams;
    use auth::TokenSettings;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::models::UserId;
    use crate::domain::user::service::AuthService;
    use crate::outbound::repositories::InMemoryUserRepository;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn app() -> (Router, Arc<Authenticator>) {
        let params = HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let authenticator =
            Arc::new(Authenticator::new(params, TokenSettings::new(SECRET)).unwrap());
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = Arc::new(AuthService::new(repository, Arc::clone(&authenticator)));

        (create_router(service, Arc::clone(&authenticator)), authenticator)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (router, _) = app();

        let response = router
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_is_public_but_listing_is_protected() {
        let (router, _) = app();

        let created = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth",
                None,
                Some(r#"{"email":"a@x.com","password":"secret1","name":"A"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let listed = router
            .oneshot(request("GET", "/api/auth", None, None))
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_subject_must_be_a_user_id() {
        let (router, authenticator) = app();
        let token = authenticator.issue_token("not-a-uuid").unwrap();

        let response = router
            .oneshot(request("GET", "/api/auth", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_caller_reaches_handlers() {
        let (router, authenticator) = app();
        let token = authenticator.issue_token(UserId::new()).unwrap();

        let listed = router
            .clone()
            .oneshot(request("GET", "/api/auth", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);

        let path = format!("/api/auth/{}", UserId::new());
        let fetched = router
            .oneshot(request("GET", &path, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_delete_not_implemented() {
        let (router, authenticator) = app();
        let token = authenticator.issue_token(UserId::new()).unwrap();
        let path = format!("/api/auth/{}", UserId::new());

        let updated = router
            .clone()
            .oneshot(request("PATCH", &path, Some(&token), Some(r#"{"name":"B"}"#)))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::NOT_IMPLEMENTED);

        let deleted = router
            .oneshot(request("DELETE", &path, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
