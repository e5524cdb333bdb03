use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{todo::LIST_LIMIT, Todo, TodoInput},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

const NOT_FOUND: &str = "Todo not found or unauthorized";

/// Lists up to 100 to-do items of every user.
///
/// This route is public and applies no ownership filter.
#[get("/")]
pub async fn list_todos(pool: web::Data<SqlitePool>) -> Result<impl Responder, AppError> {
    let todos = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, priority, complete, owner_id FROM todos ORDER BY id LIMIT ?",
    )
    .bind(LIST_LIMIT)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(todos))
}

/// Retrieves one of the caller's to-do items.
///
/// ## Responses:
/// - `200 OK`: The `Todo`.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `404 Not Found`: No such item, or it belongs to someone else. The two cases are
///   deliberately indistinguishable.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<SqlitePool>,
    todo_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, priority, complete, owner_id
         FROM todos WHERE id = ? AND owner_id = ?",
    )
    .bind(todo_id.into_inner())
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?;

    match todo {
        Some(todo) => Ok(HttpResponse::Ok().json(todo)),
        None => Err(AppError::NotFound(NOT_FOUND.into())),
    }
}

/// Creates a to-do item owned by the caller.
///
/// ## Responses:
/// - `201 Created`: `{"message": ..., "todo": Todo}`.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `422 Unprocessable Entity`: Title, description or priority out of range.
#[post("")]
pub async fn create_todo(
    pool: web::Data<SqlitePool>,
    todo_data: web::Json<TodoInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let input = todo_data.into_inner();

    let id = sqlx::query(
        "INSERT INTO todos (title, description, priority, complete, owner_id)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.priority)
    .bind(input.complete)
    .bind(user.user_id)
    .execute(&**pool)
    .await?
    .last_insert_rowid();

    let todo = Todo::from_input(id, input, user.user_id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Todo created successfully",
        "todo": todo
    })))
}

/// Replaces every mutable field of one of the caller's to-do items.
///
/// ## Responses:
/// - `200 OK`: `{"message": ...}`.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `404 Not Found`: No such item, or it belongs to someone else.
/// - `422 Unprocessable Entity`: Invalid input.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<SqlitePool>,
    todo_id: web::Path<i64>,
    todo_data: web::Json<TodoInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    // The owner filter makes a foreign item look absent.
    let result = sqlx::query(
        "UPDATE todos SET title = ?, description = ?, priority = ?, complete = ?
         WHERE id = ? AND owner_id = ?",
    )
    .bind(&todo_data.title)
    .bind(&todo_data.description)
    .bind(todo_data.priority)
    .bind(todo_data.complete)
    .bind(todo_id.into_inner())
    .bind(user.user_id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Todo updated successfully" })))
}

/// Deletes one of the caller's to-do items.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `404 Not Found`: No such item, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<SqlitePool>,
    todo_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM todos WHERE id = ? AND owner_id = ?")
        .bind(todo_id.into_inner())
        .bind(user.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
