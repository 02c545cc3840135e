//! Blog post records and their request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules::validate_slug;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    pub id: String,
    /// Writer that authored this post.
    pub author_id: String,
    pub title: String,
    /// URL-safe unique identifier used by the public blog routes.
    pub slug: String,
    pub body: String,
    pub is_published: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn new(author_id: String, payload: CreateBlogPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            author_id,
            title: payload.title,
            slug: payload.slug,
            body: payload.body,
            is_published: false,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBlogPost {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(min = 1, max = 100_000))]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateBlogPost {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100_000))]
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlogPostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BlogPost> for BlogPostResponse {
    fn from(post: BlogPost) -> Self {
        BlogPostResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            body: post.body,
            is_published: post.is_published,
            created_at: post.created_at,
        }
    }
}
