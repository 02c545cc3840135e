//! Public blog pages: published posts only.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppError,
    models::{blog_post::BlogPostResponse, PaginatedResponse, PaginationQuery},
    repositories::blog_post as post_repo,
    state::AppState,
};

pub async fn list_posts(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<BlogPostResponse>>, AppError> {
    let limit = pagination.limit();
    let offset = pagination.offset();

    let posts = post_repo::list_published(&state.pool, limit, offset).await?;
    let total = post_repo::count_published(&state.pool).await?;

    Ok(Json(PaginatedResponse::new(
        posts.into_iter().map(BlogPostResponse::from).collect(),
        total,
        limit,
        offset,
    )))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let post = post_repo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(Json(BlogPostResponse::from(post)))
}
