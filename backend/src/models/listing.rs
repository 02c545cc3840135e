//! Property listing records and their request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules::validate_price_cents;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: String,
    /// Agent that owns this listing.
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// Asking price in cents; avoids float rounding in SQL aggregates.
    pub price_cents: i64,
    pub city: String,
    pub address: String,
    /// URL on the third-party image host; upload mechanics live elsewhere.
    pub image_url: Option<String>,
    pub is_published: bool,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(owner_id: String, payload: CreateListing) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title: payload.title,
            description: payload.description,
            price_cents: payload.price_cents,
            city: payload.city,
            address: payload.address,
            image_url: payload.image_url,
            is_published: false,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateListing {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10_000))]
    pub description: String,
    #[validate(custom(function = "validate_price_cents"))]
    pub price_cents: i64,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateListing {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10_000))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price_cents"))]
    pub price_cents: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub address: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Public-facing listing shape; owner contact details stay internal.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub city: String,
    pub address: String,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        ListingResponse {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            price_cents: listing.price_cents,
            city: listing.city,
            address: listing.address,
            image_url: listing.image_url,
            is_published: listing.is_published,
            created_at: listing.created_at,
        }
    }
}
