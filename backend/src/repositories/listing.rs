//! Repository functions for property listings.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::listing::{Listing, UpdateListing};

const LISTING_COLUMNS: &str = "id, owner_id, title, description, price_cents, city, address, \
     image_url, is_published, approved_by, approved_at, created_at, updated_at";

pub async fn list_published(
    pool: &PgPool,
    city: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings \
         WHERE is_published = TRUE AND ($1::TEXT IS NULL OR city = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(city)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_published(pool: &PgPool, city: Option<&str>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM listings \
         WHERE is_published = TRUE AND ($1::TEXT IS NULL OR city = $1)",
    )
    .bind(city)
    .fetch_one(pool)
    .await
}

pub async fn find_published_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1 AND is_published = TRUE"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn list_pending(pool: &PgPool) -> Result<Vec<Listing>, sqlx::Error> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE is_published = FALSE \
         ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn insert_listing(pool: &PgPool, listing: &Listing) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO listings \
         (id, owner_id, title, description, price_cents, city, address, image_url, \
         is_published, approved_by, approved_at, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(&listing.id)
    .bind(&listing.owner_id)
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(listing.price_cents)
    .bind(&listing.city)
    .bind(&listing.address)
    .bind(&listing.image_url)
    .bind(listing.is_published)
    .bind(&listing.approved_by)
    .bind(listing.approved_at)
    .bind(listing.created_at)
    .bind(listing.updated_at)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn update_listing(
    pool: &PgPool,
    id: &str,
    changes: &UpdateListing,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE listings SET \
         title = COALESCE($2, title), \
         description = COALESCE($3, description), \
         price_cents = COALESCE($4, price_cents), \
         city = COALESCE($5, city), \
         address = COALESCE($6, address), \
         image_url = COALESCE($7, image_url), \
         updated_at = $8 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.price_cents)
    .bind(&changes.city)
    .bind(&changes.address)
    .bind(&changes.image_url)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_listing(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn approve_listing(
    pool: &PgPool,
    id: &str,
    approved_by: &str,
    approved_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE listings SET is_published = TRUE, approved_by = $2, approved_at = $3, \
         updated_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(approved_by)
    .bind(approved_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
