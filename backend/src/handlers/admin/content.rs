//! Content approval: the admin action that flips `is_published` and stamps
//! `approved_by`/`approved_at`.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        activity::ActivityAction,
        blog_post::BlogPostResponse,
        listing::ListingResponse,
    },
    repositories::{blog_post as post_repo, listing as listing_repo},
    state::AppState,
    utils::net::extract_client_ip,
};

use super::require_admin;

/// Unpublished content awaiting review, oldest first.
pub async fn pending_content(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, &headers)?;

    let listings = listing_repo::list_pending(&state.pool).await?;
    let posts = post_repo::list_pending(&state.pool).await?;

    Ok(Json(json!({
        "listings": listings
            .into_iter()
            .map(ListingResponse::from)
            .collect::<Vec<_>>(),
        "posts": posts
            .into_iter()
            .map(BlogPostResponse::from)
            .collect::<Vec<_>>(),
    })))
}

pub async fn approve_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, AppError> {
    let admin_id = require_admin(&state, &headers)?;

    let listing = listing_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    listing_repo::approve_listing(&state.pool, &id, &admin_id, Utc::now()).await?;
    let approved = listing_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    state.activity_log.log_listing(
        Some(admin_id),
        ActivityAction::Approve,
        &listing.id,
        &listing.title,
        extract_client_ip(&headers),
    );

    Ok(Json(ListingResponse::from(approved)))
}

pub async fn approve_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let admin_id = require_admin(&state, &headers)?;

    let post = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    post_repo::approve_post(&state.pool, &id, &admin_id, Utc::now()).await?;
    let approved = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    state.activity_log.log_blog_post(
        Some(admin_id),
        ActivityAction::Approve,
        &post.id,
        &post.title,
        extract_client_ip(&headers),
    );

    Ok(Json(BlogPostResponse::from(approved)))
}
