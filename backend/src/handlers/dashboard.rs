//! Agent/writer dashboard. The session gate guarantees a live session on
//! these routes but attaches nothing; each handler resolves the caller's
//! identity itself and answers JSON 401 when none resolves.

use axum::{
    extract::{Path, State},
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
        blog_post::{BlogPost, BlogPostResponse, CreateBlogPost, UpdateBlogPost},
        listing::{CreateListing, Listing, ListingResponse, UpdateListing},
        user::UserRole,
    },
    repositories::{blog_post as post_repo, listing as listing_repo},
    services::identity::{resolve_identity, Identity},
    state::AppState,
    utils::net::extract_client_ip,
};

async fn require_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    resolve_identity(
        headers,
        &state.config.jwt_secret,
        state.identity_store.as_ref(),
    )
    .await
    .ok_or_else(AppError::unauthorized)
}

pub async fn overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = require_identity(&state, &headers).await?;

    let listings = listing_repo::list_by_owner(&state.pool, &identity.id).await?;
    let posts = post_repo::list_by_author(&state.pool, &identity.id).await?;

    Ok(Json(json!({
        "role": identity.role.as_str(),
        "listings": {
            "total": listings.len(),
            "published": listings.iter().filter(|l| l.is_published).count(),
        },
        "posts": {
            "total": posts.len(),
            "published": posts.iter().filter(|p| p.is_published).count(),
        },
    })))
}

pub async fn my_listings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let identity = require_identity(&state, &headers).await?;
    let listings = listing_repo::list_by_owner(&state.pool, &identity.id).await?;
    Ok(Json(
        listings.into_iter().map(ListingResponse::from).collect(),
    ))
}

pub async fn create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateListing>,
) -> Result<impl IntoResponse, AppError> {
    let identity = require_identity(&state, &headers).await?;
    if !matches!(identity.role, UserRole::Admin | UserRole::Agent) {
        return Err(AppError::Forbidden(
            "Only agents can create listings".to_string(),
        ));
    }
    payload.validate()?;

    let listing = Listing::new(identity.id.clone(), payload);
    listing_repo::insert_listing(&state.pool, &listing).await?;

    state.activity_log.log_listing(
        Some(identity.id),
        ActivityAction::Create,
        &listing.id,
        &listing.title,
        extract_client_ip(&headers),
    );

    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

pub async fn update_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListing>,
) -> Result<Json<ListingResponse>, AppError> {
    let identity = require_identity(&state, &headers).await?;
    payload.validate()?;

    let listing = listing_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    ensure_owner_or_admin(&identity, &listing.owner_id)?;

    listing_repo::update_listing(&state.pool, &id, &payload).await?;
    let updated = listing_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    state.activity_log.log_listing(
        Some(identity.id),
        ActivityAction::Update,
        &updated.id,
        &updated.title,
        extract_client_ip(&headers),
    );

    Ok(Json(ListingResponse::from(updated)))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = require_identity(&state, &headers).await?;

    let listing = listing_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    ensure_owner_or_admin(&identity, &listing.owner_id)?;

    listing_repo::delete_listing(&state.pool, &id).await?;

    state.activity_log.log_listing(
        Some(identity.id),
        ActivityAction::Delete,
        &listing.id,
        &listing.title,
        extract_client_ip(&headers),
    );

    Ok(Json(json!({ "ok": true })))
}

pub async fn my_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BlogPostResponse>>, AppError> {
    let identity = require_identity(&state, &headers).await?;
    let posts = post_repo::list_by_author(&state.pool, &identity.id).await?;
    Ok(Json(posts.into_iter().map(BlogPostResponse::from).collect()))
}

pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBlogPost>,
) -> Result<impl IntoResponse, AppError> {
    let identity = require_identity(&state, &headers).await?;
    if !matches!(identity.role, UserRole::Admin | UserRole::Writer) {
        return Err(AppError::Forbidden(
            "Only writers can create posts".to_string(),
        ));
    }
    payload.validate()?;

    if post_repo::find_by_slug(&state.pool, &payload.slug)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Slug already in use".to_string()));
    }

    let post = BlogPost::new(identity.id.clone(), payload);
    post_repo::insert_post(&state.pool, &post).await?;

    state.activity_log.log_blog_post(
        Some(identity.id),
        ActivityAction::Create,
        &post.id,
        &post.title,
        extract_client_ip(&headers),
    );

    Ok((StatusCode::CREATED, Json(BlogPostResponse::from(post))))
}

pub async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBlogPost>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let identity = require_identity(&state, &headers).await?;
    payload.validate()?;

    let post = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    ensure_owner_or_admin(&identity, &post.author_id)?;

    post_repo::update_post(&state.pool, &id, &payload).await?;
    let updated = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    state.activity_log.log_blog_post(
        Some(identity.id),
        ActivityAction::Update,
        &updated.id,
        &updated.title,
        extract_client_ip(&headers),
    );

    Ok(Json(BlogPostResponse::from(updated)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = require_identity(&state, &headers).await?;

    let post = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    ensure_owner_or_admin(&identity, &post.author_id)?;

    post_repo::delete_post(&state.pool, &id).await?;

    state.activity_log.log_blog_post(
        Some(identity.id),
        ActivityAction::Delete,
        &post.id,
        &post.title,
        extract_client_ip(&headers),
    );

    Ok(Json(json!({ "ok": true })))
}

fn ensure_owner_or_admin(identity: &Identity, owner_id: &str) -> Result<(), AppError> {
    if identity.id == owner_id || identity.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not own this record".to_string(),
        ))
    }
}
