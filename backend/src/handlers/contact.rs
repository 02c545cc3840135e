//! Public contact form. The only write reachable without a session, so it
//! is the one endpoint consulting the rate limiter before doing any work.

use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::contact::{ContactMessage, CreateContactMessage},
    repositories::contact as contact_repo,
    services::rate_limit::RateLimitPolicy,
    state::AppState,
    utils::net::{client_identifier, extract_client_ip},
};

pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateContactMessage>,
) -> Result<Response, AppError> {
    let policy = RateLimitPolicy::new(
        state.config.rate_limit_contact_max_requests,
        Duration::from_secs(state.config.rate_limit_contact_window_seconds),
    );
    let decision = state
        .rate_limiter
        .check(&client_identifier(&headers), policy);
    if !decision.allowed {
        return Ok(too_many_requests(decision.retry_after_secs(Instant::now())));
    }

    payload.validate()?;

    let message = ContactMessage::new(payload, extract_client_ip(&headers));
    contact_repo::insert_contact_message(&state.pool, &message).await?;

    tracing::info!(message_id = %message.id, "Contact inquiry received");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "id": message.id })),
    )
        .into_response())
}

fn too_many_requests(retry_after: u64) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Too many requests. Please try again later.",
            "code": "RATE_LIMITED",
            "retry_after": retry_after,
        })),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert("retry-after", value);
    }
    response
}
