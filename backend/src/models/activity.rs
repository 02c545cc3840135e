use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};

/// Append-only audit record; never updated or deleted by normal flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: String,
    pub user_id: Option<String>,
    pub action: ActivityAction,
    pub item_type: ItemType,
    pub item_id: Option<String>,
    pub metadata: Option<Json<Value>>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Login,
    Logout,
    Create,
    Update,
    Delete,
    Approve,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Approve => "approve",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Listing,
    BlogPost,
    User,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Listing => "listing",
            ItemType::BlogPost => "blog_post",
            ItemType::User => "user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_and_item_type_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(ActivityAction::Approve).unwrap(),
            "approve"
        );
        assert_eq!(
            serde_json::to_value(ItemType::BlogPost).unwrap(),
            "blog_post"
        );
    }
}
