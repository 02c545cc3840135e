//! Admin user management.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        activity::ActivityAction,
        user::{CreateUser, UpdateUser, User, UserResponse, UserRole},
        PaginatedResponse, PaginationQuery,
    },
    repositories::user as user_repo,
    state::AppState,
    utils::{net::extract_client_ip, password::hash_password},
};

use super::require_admin;

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    require_admin(&state, &headers)?;

    let limit = pagination.limit();
    let offset = pagination.offset();
    let users = user_repo::list_users(&state.pool, limit, offset).await?;
    let total = user_repo::count_users(&state.pool).await?;

    Ok(Json(PaginatedResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset,
    )))
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUser>,
) -> Result<impl IntoResponse, AppError> {
    let admin_id = require_admin(&state, &headers)?;
    payload.validate()?;

    if user_repo::find_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(payload.email, password_hash, payload.display_name, payload.role);
    user_repo::insert_user(&state.pool, &user).await?;

    state.activity_log.log_user(
        Some(admin_id),
        ActivityAction::Create,
        &user.id,
        &user.email,
        extract_client_ip(&headers),
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    let admin_id = require_admin(&state, &headers)?;

    let target = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // An admin may not remove their own access.
    if target.id == admin_id && matches!(payload.role, Some(role) if role != UserRole::Admin) {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }

    if let Some(display_name) = payload.display_name.as_deref() {
        crate::validation::rules::validate_display_name(display_name)
            .map_err(|_| AppError::BadRequest("Invalid display name".to_string()))?;
    }

    user_repo::update_user(&state.pool, &id, payload.display_name.as_deref(), payload.role)
        .await?;
    let updated = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state.activity_log.log_user(
        Some(admin_id),
        ActivityAction::Update,
        &updated.id,
        &updated.email,
        extract_client_ip(&headers),
    );

    Ok(Json(UserResponse::from(updated)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let admin_id = require_admin(&state, &headers)?;

    if id == admin_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let target = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user_repo::delete_user(&state.pool, &id).await?;

    state.activity_log.log_user(
        Some(admin_id),
        ActivityAction::Delete,
        &target.id,
        &target.email,
        extract_client_ip(&headers),
    );

    Ok(Json(json!({ "ok": true })))
}
