//! Models that represent site users, credentials, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules::validate_display_name;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a registered account.
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Unique email address used for login.
    pub email: String,
    /// Name shown on listings, posts, and the dashboard.
    pub display_name: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Role describing the user's privileges; the sole authorization axis.
    pub role: UserRole,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
pub enum UserRole {
    /// Full administrative access: user management, approvals, audit viewer.
    Admin,
    /// Manages property listings from the dashboard.
    #[default]
    Agent,
    /// Manages blog posts from the dashboard.
    Writer,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Agent => "agent",
            UserRole::Writer => "writer",
        }
    }

    /// Parses a role string, tolerating the casings older issuance paths
    /// produced (`ADMIN`, `Admin`, ...). Canonical output is snake_case.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "agent" => Some(UserRole::Agent),
            "writer" => Some(UserRole::Writer),
            _ => match value.to_ascii_lowercase().as_str() {
                "admin" => Some(UserRole::Admin),
                "agent" => Some(UserRole::Agent),
                "writer" => Some(UserRole::Writer),
                _ => None,
            },
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserRole::parse(&s).ok_or_else(|| {
            serde::de::Error::unknown_variant(&s, &["admin", "agent", "writer"])
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Payload for creating a new user account (admin panel).
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(custom(function = "validate_display_name"))]
    pub display_name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
/// Payload for updating portions of an existing user (admin panel).
pub struct UpdateUser {
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize, Deserialize)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role.as_str().to_string(),
        }
    }
}

impl User {
    /// Constructs a new user with freshly generated identifiers.
    pub fn new(email: String, password_hash: String, display_name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            display_name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the user holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Returns `true` when the user may manage property listings.
    pub fn can_manage_listings(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Agent)
    }

    /// Returns `true` when the user may manage blog posts.
    pub fn can_manage_posts(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Writer)
    }
}
