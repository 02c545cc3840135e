//! Login, logout, and session maintenance.

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::activity::ActivityAction,
    models::user::{LoginRequest, UserResponse},
    repositories::user as user_repo,
    services::identity::{resolve_identity, token_from_headers},
    state::AppState,
    utils::{
        cookies::{build_session_cookie, clear_session_cookies},
        jwt::{decode_session_token, encode_session_claims, issue_session_token,
            server_start_epoch_ms},
        net::extract_client_ip,
        password::verify_password,
    },
};

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = user_repo::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let password_ok = verify_password(&payload.password, &user.password_hash)?;
    if !password_ok {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = issue_session_token(
        &user,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;
    let cookie = build_session_cookie(
        &token,
        Duration::from_secs(state.config.jwt_expiration_hours * 3600),
        state.cookie_options(),
    );

    state.activity_log.log_user(
        Some(user.id.clone()),
        ActivityAction::Login,
        &user.id,
        &user.email,
        extract_client_ip(&headers),
    );

    let mut response = Json(UserResponse::from(user)).into_response();
    append_cookie(&mut response, &cookie);
    Ok(response)
}

/// Clears the session unconditionally. The logout activity entry is
/// best-effort: whatever identity the (possibly stale) token still carries.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(claims) = token_from_headers(&headers)
        .and_then(|token| decode_session_token(&token, &state.config.jwt_secret).ok())
    {
        if !claims.sub.is_empty() {
            state.activity_log.log_user(
                Some(claims.sub.clone()),
                ActivityAction::Logout,
                &claims.sub,
                &claims.email,
                extract_client_ip(&headers),
            );
        }
    }

    let mut response = Json(json!({ "ok": true })).into_response();
    for cookie in clear_session_cookies(state.cookie_options()) {
        append_cookie(&mut response, &cookie);
    }
    response
}

/// Activity ping: re-issues the session cookie with a fresh last-activity
/// claim. Enforces the same epoch and idle policy as the gate, but answers
/// with JSON 401 (clearing cookies) instead of a redirect.
pub async fn refresh_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let claims = token_from_headers(&headers)
        .and_then(|token| decode_session_token(&token, &state.config.jwt_secret).ok())
        .ok_or_else(AppError::unauthorized)?;

    let threshold_ms = state.config.idle_timeout_minutes.saturating_mul(60_000) as i64;
    let expired = !claims.matches_server_epoch(server_start_epoch_ms())
        || claims.idle_longer_than(threshold_ms, chrono::Utc::now().timestamp_millis());
    if expired {
        let mut response =
            AppError::Unauthorized("Session expired".to_string()).into_response();
        for cookie in clear_session_cookies(state.cookie_options()) {
            append_cookie(&mut response, &cookie);
        }
        return Ok(response);
    }

    let refreshed = claims.refreshed(state.config.jwt_expiration_hours);
    let token = encode_session_claims(&refreshed, &state.config.jwt_secret)?;
    let cookie = build_session_cookie(
        &token,
        Duration::from_secs(state.config.jwt_expiration_hours * 3600),
        state.cookie_options(),
    );

    let mut response = Json(json!({
        "ok": true,
        "last_activity": refreshed.last_activity,
    }))
    .into_response();
    append_cookie(&mut response, &cookie);
    Ok(response)
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = resolve_identity(
        &headers,
        &state.config.jwt_secret,
        state.identity_store.as_ref(),
    )
    .await
    .ok_or_else(AppError::unauthorized)?;

    Ok(Json(json!({
        "id": identity.id,
        "role": identity.role.as_str(),
    })))
}

fn append_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
