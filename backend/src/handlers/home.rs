use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    error::AppError,
    repositories::{blog_post as post_repo, listing as listing_repo},
    state::AppState,
};

/// Home payload: headline counts the marketing pages render.
pub async fn home(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let published_listings = listing_repo::count_published(&state.pool, None).await?;
    let published_posts = post_repo::count_published(&state.pool).await?;

    Ok(Json(json!({
        "published_listings": published_listings,
        "published_posts": published_posts,
    })))
}

pub async fn forbidden() -> impl IntoResponse {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "You do not have access to this page",
            "code": "FORBIDDEN",
        })),
    )
}
