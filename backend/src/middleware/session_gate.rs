//! Request-level session gate.
//!
//! Runs ahead of every routed handler and filters requests to the
//! protected prefixes. Decisions are made from the session token alone:
//! pass through, redirect home, or clear cookies and redirect. The gate
//! checks existence of identity only; admin-role verification stays with
//! the admin handlers, which have richer context.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::state::AppState;
use crate::utils::cookies::{clear_session_cookies, extract_session_token};
use crate::utils::jwt::{decode_session_token, server_start_epoch_ms};

pub const ADMIN_PREFIX: &str = "/admin";
pub const DASHBOARD_PREFIX: &str = "/dashboard";
const HOME_ROUTE: &str = "/";

/// Paths that are always served anonymously. Kept as the documented
/// allowlist even though none of them fall under a protected prefix.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/listings",
    "/blog",
    "/contact",
    "/login",
    "/api/auth",
    "/403",
    "/auth/callback",
];

pub async fn session_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    // Anything outside the protected prefixes passes through with no token
    // work at all.
    if is_public_path(path) || !is_protected_path(path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_session_token);

    // Absent token: redirect without touching cookies (nothing to clear).
    // An undecodable token yields no identity and lands here too.
    let Some(token) = token else {
        return redirect_home();
    };
    let Ok(claims) = decode_session_token(&token, &state.config.jwt_secret) else {
        return redirect_home();
    };

    // Token predates the current process: force a fresh login.
    if !claims.matches_server_epoch(server_start_epoch_ms()) {
        return clear_cookies_and_redirect(&state);
    }

    let threshold_ms = state
        .config
        .idle_timeout_minutes
        .saturating_mul(60_000) as i64;
    if claims.idle_longer_than(threshold_ms, Utc::now().timestamp_millis()) {
        return clear_cookies_and_redirect(&state);
    }

    // Admin pages require a subject; the role check itself is delegated.
    if path_has_prefix(path, ADMIN_PREFIX) && claims.sub.is_empty() {
        return clear_cookies_and_redirect(&state);
    }

    next.run(request).await
}

pub fn is_protected_path(path: &str) -> bool {
    path_has_prefix(path, ADMIN_PREFIX) || path_has_prefix(path, DASHBOARD_PREFIX)
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS
        .iter()
        .any(|public| (*public == HOME_ROUTE && path == HOME_ROUTE) || path_has_prefix(path, public))
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == HOME_ROUTE {
        return false;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn redirect_home() -> Response {
    Redirect::to(HOME_ROUTE).into_response()
}

fn clear_cookies_and_redirect(state: &AppState) -> Response {
    let mut response = redirect_home();
    for cookie in clear_session_cookies(state.cookie_options()) {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
