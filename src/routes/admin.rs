use crate::{auth::AuthenticatedUser, error::AppError, models::Todo};
use actix_web::{get, web, HttpResponse, Responder};
use sqlx::SqlitePool;

/// Lists every to-do item of every user. Admin role only.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Todo`.
/// - `401 Unauthorized`: Missing token, or the caller's role is not `admin`.
#[get("/todo")]
pub async fn list_all_todos(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    user.require_admin()?;

    let todos = sqlx::query_as::<_, Todo>(
        "SELECT id, title, description, priority, complete, owner_id FROM todos ORDER BY id",
    )
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(todos))
}
