use crate::{
    auth::{hash_password, verify_password, AuthenticatedUser},
    config::Config,
    error::AppError,
    models::{PasswordChange, User},
};
use actix_web::{get, put, web, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// Returns the caller's own account record.
///
/// A valid token whose user no longer exists is treated as an authentication failure.
#[get("/")]
pub async fn get_user(
    pool: web::Data<SqlitePool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let record = sqlx::query_as::<_, User>(
        "SELECT id, username, email, first_name, last_name, role, hashed_password, is_active
         FROM users WHERE id = ?",
    )
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Authentication failed".into()))?;

    Ok(HttpResponse::Ok().json(record))
}

/// Changes the caller's password after checking the current one.
///
/// Outstanding tokens stay valid after the change.
///
/// ## Responses:
/// - `204 No Content`: Password replaced.
/// - `401 Unauthorized`: Missing token, or `password` does not match the stored hash.
/// - `422 Unprocessable Entity`: `new_password` shorter than 6 characters.
#[put("/password")]
pub async fn change_password(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<PasswordChange>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let mut tx = pool.begin().await?;

    let stored_hash =
        sqlx::query_scalar::<_, String>("SELECT hashed_password FROM users WHERE id = ?")
            .bind(user.user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication failed".into()))?;

    if !verify_password(&payload.password, &stored_hash)? {
        log::warn!("rejected password change for user {}", user.user_id);
        return Err(AppError::Unauthorized("Error on password change".into()));
    }

    let new_hash = hash_password(&payload.new_password, config.bcrypt_cost)?;
    sqlx::query("UPDATE users SET hashed_password = ? WHERE id = ?")
        .bind(&new_hash)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    log::info!("password changed for user {}", user.user_id);
    Ok(HttpResponse::NoContent().finish())
}
