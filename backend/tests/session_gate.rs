//! Gate behavior over protected and public path prefixes, driven through a
//! real router. The database pool is lazy and never connected: every path
//! exercised here must decide from the token alone.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use acrelist_backend::config::Config;
use acrelist_backend::middleware::session_gate;
use acrelist_backend::models::user::{User, UserRole};
use acrelist_backend::services::activity_log::{ActivityLogService, ActivitySink};
use acrelist_backend::services::identity::{Identity, IdentityStore};
use acrelist_backend::services::rate_limit::FixedWindowLimiter;
use acrelist_backend::state::AppState;
use acrelist_backend::utils::cookies::{SameSite, SESSION_COOKIE_NAME};
use acrelist_backend::utils::jwt::{encode_session_claims, server_start_epoch_ms, SessionClaims};

const SECRET: &str = "gate-test-secret";

struct NoopSink;

#[async_trait::async_trait]
impl ActivitySink for NoopSink {
    async fn record(
        &self,
        _activity: acrelist_backend::models::activity::Activity,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

struct UnusedStore;

#[async_trait::async_trait]
impl IdentityStore for UnusedStore {
    async fn find_identity(&self, _user_id: &str) -> anyhow::Result<Option<Identity>> {
        panic!("the gate must never consult the identity store");
    }
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/acrelist_test".to_string(),
        jwt_secret: SECRET.to_string(),
        jwt_expiration_hours: 8,
        idle_timeout_minutes: 10,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        rate_limit_contact_max_requests: 5,
        rate_limit_contact_window_seconds: 60,
        listen_port: 3000,
    }
}

fn test_state() -> AppState {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&test_config().database_url)
        .expect("create lazy pool");
    AppState::with_capabilities(
        pool,
        test_config(),
        Arc::new(UnusedStore),
        ActivityLogService::new(Arc::new(NoopSink)),
        Arc::new(FixedWindowLimiter::new()),
    )
}

fn gated_app() -> Router {
    let state = test_state();
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/listings", get(|| async { "listings" }))
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/dashboard/listings", get(|| async { "my listings" }))
        .route("/admin/users", get(|| async { "admin users" }))
        .layer(axum_middleware::from_fn_with_state(state, session_gate))
}

fn fresh_claims() -> SessionClaims {
    let user = User::new(
        "agent@acrelist.test".into(),
        "hash".into(),
        "Agent".into(),
        UserRole::Agent,
    );
    SessionClaims::new(&user, 8)
}

fn request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE_NAME, token),
        );
    }
    builder.body(Body::empty()).expect("build request")
}

fn session_cookie_headers(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.contains("session-token"))
        .map(|value| value.to_string())
        .collect()
}

#[tokio::test]
async fn public_paths_pass_through_without_token() {
    for path in ["/", "/listings"] {
        let response = gated_app()
            .oneshot(request(path, None))
            .await
            .expect("call app");
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
        assert!(session_cookie_headers(&response).is_empty());
    }
}

#[tokio::test]
async fn public_paths_ignore_garbage_tokens() {
    let response = gated_app()
        .oneshot(request("/listings", Some("not-even-a-jwt")))
        .await
        .expect("call app");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_paths_without_token_redirect_home() {
    for path in ["/admin/users", "/dashboard", "/dashboard/listings"] {
        let response = gated_app()
            .oneshot(request(path, None))
            .await
            .expect("call app");
        assert!(
            response.status().is_redirection(),
            "path {path} should redirect"
        );
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/",
            "path {path}"
        );
        // Nothing to clear: the response must carry no session cookies.
        assert!(session_cookie_headers(&response).is_empty(), "path {path}");
    }
}

#[tokio::test]
async fn undecodable_token_is_treated_as_absent() {
    let response = gated_app()
        .oneshot(request("/dashboard", Some("garbage.token.value")))
        .await
        .expect("call app");
    assert!(response.status().is_redirection());
    assert!(session_cookie_headers(&response).is_empty());
}

#[tokio::test]
async fn stale_epoch_clears_both_cookie_names_and_redirects() {
    let mut claims = fresh_claims();
    claims.server_start = server_start_epoch_ms() - 1;
    let token = encode_session_claims(&claims, SECRET).expect("encode");

    let response = gated_app()
        .oneshot(request("/dashboard", Some(&token)))
        .await
        .expect("call app");
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let cleared = session_cookie_headers(&response);
    assert!(cleared.iter().any(|c| c.starts_with("session-token=;")));
    assert!(cleared
        .iter()
        .any(|c| c.starts_with("__Secure-session-token=;")));
}

#[tokio::test]
async fn idle_session_is_rejected_after_threshold() {
    let mut claims = fresh_claims();
    claims.last_activity -= 11 * 60 * 1000;
    let token = encode_session_claims(&claims, SECRET).expect("encode");

    let response = gated_app()
        .oneshot(request("/dashboard", Some(&token)))
        .await
        .expect("call app");
    assert!(response.status().is_redirection());
    assert!(!session_cookie_headers(&response).is_empty());
}

#[tokio::test]
async fn active_session_within_threshold_is_allowed() {
    let mut claims = fresh_claims();
    claims.last_activity -= 9 * 60 * 1000;
    let token = encode_session_claims(&claims, SECRET).expect("encode");

    let response = gated_app()
        .oneshot(request("/dashboard", Some(&token)))
        .await
        .expect("call app");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_allows_any_authenticated_role() {
    for role in [UserRole::Agent, UserRole::Writer, UserRole::Admin] {
        let user = User::new("u@acrelist.test".into(), "hash".into(), "U".into(), role);
        let token =
            encode_session_claims(&SessionClaims::new(&user, 8), SECRET).expect("encode");
        let response = gated_app()
            .oneshot(request("/dashboard/listings", Some(&token)))
            .await
            .expect("call app");
        assert_eq!(response.status(), StatusCode::OK, "role {:?}", role);
    }
}

#[tokio::test]
async fn gate_does_not_enforce_admin_role_on_admin_paths() {
    // Existence-of-identity only; role verification is the handlers' job.
    let user = User::new(
        "writer@acrelist.test".into(),
        "hash".into(),
        "W".into(),
        UserRole::Writer,
    );
    let token = encode_session_claims(&SessionClaims::new(&user, 8), SECRET).expect("encode");
    let response = gated_app()
        .oneshot(request("/admin/users", Some(&token)))
        .await
        .expect("call app");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_path_requires_a_subject() {
    let mut claims = fresh_claims();
    claims.sub = String::new();
    let token = encode_session_claims(&claims, SECRET).expect("encode");

    let response = gated_app()
        .oneshot(request("/admin/users", Some(&token)))
        .await
        .expect("call app");
    assert!(response.status().is_redirection());
    assert!(!session_cookie_headers(&response).is_empty());
}
