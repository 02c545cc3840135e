//! Audit writes must never fail or block the operation that triggered
//! them: a raising sink still leaves the surrounding handler successful.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tower::ServiceExt;

use acrelist_backend::build_router;
use acrelist_backend::config::Config;
use acrelist_backend::models::activity::{Activity, ActivityAction};
use acrelist_backend::models::user::{User, UserRole};
use acrelist_backend::services::activity_log::{ActivityLogService, ActivitySink};
use acrelist_backend::services::identity::{Identity, IdentityStore};
use acrelist_backend::services::rate_limit::FixedWindowLimiter;
use acrelist_backend::state::AppState;
use acrelist_backend::utils::cookies::{SameSite, SESSION_COOKIE_NAME};
use acrelist_backend::utils::jwt::{encode_session_claims, SessionClaims};

const SECRET: &str = "activity-test-secret";

struct RaisingSink {
    tx: mpsc::UnboundedSender<Activity>,
}

#[async_trait::async_trait]
impl ActivitySink for RaisingSink {
    async fn record(&self, activity: Activity) -> anyhow::Result<()> {
        self.tx.send(activity).ok();
        Err(anyhow::anyhow!("audit store is down"))
    }
}

struct NoopStore;

#[async_trait::async_trait]
impl IdentityStore for NoopStore {
    async fn find_identity(&self, _user_id: &str) -> anyhow::Result<Option<Identity>> {
        Ok(None)
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

#[tokio::test]
async fn logout_succeeds_even_when_the_audit_write_raises() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&test_config().database_url)
        .expect("create lazy pool");
    let state = AppState::with_capabilities(
        pool,
        test_config(),
        Arc::new(NoopStore),
        ActivityLogService::new(Arc::new(RaisingSink { tx })),
        Arc::new(FixedWindowLimiter::new()),
    );
    let app = build_router(state);

    let user = User::new(
        "agent@acrelist.test".into(),
        "hash".into(),
        "Agent".into(),
        UserRole::Agent,
    );
    let token = encode_session_claims(&SessionClaims::new(&user, 8), SECRET).expect("encode");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(
                    header::COOKIE,
                    format!("{}={}", SESSION_COOKIE_NAME, token),
                )
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call app");

    // Primary operation completed despite the raising sink.
    assert_eq!(response.status(), StatusCode::OK);
    let cleared: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    assert!(cleared.iter().any(|c| c.starts_with("session-token=;")));
    assert!(cleared
        .iter()
        .any(|c| c.starts_with("__Secure-session-token=;")));

    // The sink was really invoked with the logout event before raising.
    let recorded = rx.recv().await.expect("sink invoked");
    assert_eq!(recorded.action, ActivityAction::Logout);
    assert_eq!(recorded.user_id.as_deref(), Some(user.id.as_str()));
}

#[tokio::test]
async fn logout_without_a_token_still_succeeds_and_logs_nothing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&test_config().database_url)
        .expect("create lazy pool");
    let state = AppState::with_capabilities(
        pool,
        test_config(),
        Arc::new(NoopStore),
        ActivityLogService::new(Arc::new(RaisingSink { tx })),
        Arc::new(FixedWindowLimiter::new()),
    );
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call app");
    assert_eq!(response.status(), StatusCode::OK);

    // No identity, no audit entry.
    assert!(rx.try_recv().is_err());
}
