//! Public listing pages: published inventory only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{listing::ListingResponse, PaginatedResponse, PaginationQuery},
    repositories::listing as listing_repo,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub city: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PaginatedResponse<ListingResponse>>, AppError> {
    let pagination = PaginationQuery {
        limit: query.limit.unwrap_or_else(|| PaginationQuery::default().limit),
        offset: query.offset.unwrap_or(0),
    };
    let limit = pagination.limit();
    let offset = pagination.offset();
    let city = query.city.as_deref();

    let listings = listing_repo::list_published(&state.pool, city, limit, offset).await?;
    let total = listing_repo::count_published(&state.pool, city).await?;

    Ok(Json(PaginatedResponse::new(
        listings.into_iter().map(ListingResponse::from).collect(),
        total,
        limit,
        offset,
    )))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = listing_repo::find_published_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(ListingResponse::from(listing)))
}
