use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Upper bound on rows returned by the public listing.
pub const LIST_LIMIT: i64 = 100;

/// Input structure for creating or replacing a to-do item.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// Must be at least 3 characters.
    #[validate(length(min = 3))]
    pub title: String,

    /// Between 3 and 100 characters.
    #[validate(length(min = 3, max = 100))]
    pub description: String,

    /// 1 (lowest) to 5 (highest).
    #[validate(range(min = 1, max = 5))]
    pub priority: i32,

    #[serde(default)]
    pub complete: bool,
}

/// A to-do item as stored in the `todos` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub complete: bool,
    /// Id of the user who created the item. Only that user may read, update or delete it.
    pub owner_id: i64,
}

impl Todo {
    /// Builds the stored representation once the database has assigned an id.
    pub fn from_input(id: i64, input: TodoInput, owner_id: i64) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            complete: input.complete,
            owner_id,
        }
    }
}
