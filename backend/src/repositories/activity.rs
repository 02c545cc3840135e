//! Repository functions for the append-only activity log.

use sqlx::PgPool;

use crate::models::activity::Activity;

const ACTIVITY_COLUMNS: &str =
    "id, user_id, action, item_type, item_id, metadata, ip_address, created_at";

#[derive(Debug, Default, Clone)]
pub struct ActivityFilters {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub item_type: Option<String>,
}

pub async fn insert_activity(pool: &PgPool, activity: &Activity) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activities \
         (id, user_id, action, item_type, item_id, metadata, ip_address, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&activity.id)
    .bind(&activity.user_id)
    .bind(activity.action.as_str())
    .bind(activity.item_type.as_str())
    .bind(&activity.item_id)
    .bind(&activity.metadata)
    .bind(&activity.ip_address)
    .bind(activity.created_at)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn list_activities(
    pool: &PgPool,
    filters: &ActivityFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {ACTIVITY_COLUMNS} FROM activities \
         WHERE ($1::TEXT IS NULL OR user_id = $1) \
         AND ($2::TEXT IS NULL OR action = $2) \
         AND ($3::TEXT IS NULL OR item_type = $3) \
         ORDER BY created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(&filters.user_id)
    .bind(&filters.action)
    .bind(&filters.item_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_activities(
    pool: &PgPool,
    filters: &ActivityFilters,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM activities \
         WHERE ($1::TEXT IS NULL OR user_id = $1) \
         AND ($2::TEXT IS NULL OR action = $2) \
         AND ($3::TEXT IS NULL OR item_type = $3)",
    )
    .bind(&filters.user_id)
    .bind(&filters.action)
    .bind(&filters.item_type)
    .fetch_one(pool)
    .await
}
