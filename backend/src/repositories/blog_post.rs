//! Repository functions for blog posts.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::blog_post::{BlogPost, UpdateBlogPost};

const POST_COLUMNS: &str = "id, author_id, title, slug, body, is_published, approved_by, \
     approved_at, created_at, updated_at";

pub async fn list_published(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE is_published = TRUE \
         ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_published(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE is_published = TRUE")
        .fetch_one(pool)
        .await
}

pub async fn find_published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1 AND is_published = TRUE"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_author(pool: &PgPool, author_id: &str) -> Result<Vec<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE author_id = $1 ORDER BY created_at DESC"
    ))
    .bind(author_id)
    .fetch_all(pool)
    .await
}

pub async fn list_pending(pool: &PgPool) -> Result<Vec<BlogPost>, sqlx::Error> {
    sqlx::query_as::<_, BlogPost>(&format!(
        "SELECT {POST_COLUMNS} FROM blog_posts WHERE is_published = FALSE \
         ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn insert_post(pool: &PgPool, post: &BlogPost) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO blog_posts \
         (id, author_id, title, slug, body, is_published, approved_by, approved_at, \
         created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&post.id)
    .bind(&post.author_id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.body)
    .bind(post.is_published)
    .bind(&post.approved_by)
    .bind(post.approved_at)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn update_post(
    pool: &PgPool,
    id: &str,
    changes: &UpdateBlogPost,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE blog_posts SET \
         title = COALESCE($2, title), \
         body = COALESCE($3, body), \
         updated_at = $4 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&changes.title)
    .bind(&changes.body)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_post(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn approve_post(
    pool: &PgPool,
    id: &str,
    approved_by: &str,
    approved_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE blog_posts SET is_published = TRUE, approved_by = $2, approved_at = $3, \
         updated_at = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(approved_by)
    .bind(approved_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
