use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Inquiry submitted through the public contact form. Delivery (email,
/// CRM sync) happens outside this service; rows are the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(payload: CreateContactMessage, ip_address: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            email: payload.email,
            message: payload.message,
            ip_address,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateContactMessage {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}
