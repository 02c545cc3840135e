//! Admin panel handlers. Every endpoint here re-verifies the admin role
//! from the signed token; the session gate only guarantees a subject.

use axum::http::HeaderMap;

use crate::{error::AppError, services::identity::verify_admin, state::AppState};

pub mod activities;
pub mod content;
pub mod users;

/// Admin check shared by every handler in this module: a falsy result or a
/// missing subject is an unconditional 401.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let check = verify_admin(headers, &state.config.jwt_secret);
    match check.user_id {
        Some(user_id) if check.is_admin => Ok(user_id),
        _ => Err(AppError::unauthorized()),
    }
}
