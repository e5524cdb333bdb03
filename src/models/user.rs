use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const ADMIN_ROLE: &str = "admin";

/// A row of the `users` table. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
}

/// Payload of `PUT /users/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordChange {
    /// Current password, checked against the stored hash.
    pub password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}
