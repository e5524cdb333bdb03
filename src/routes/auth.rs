use crate::{
    auth::{
        authenticate, hash_password, RegisterRequest, RegisterResponse, TokenRequest,
        TokenResponse, TokenService,
    },
    config::Config,
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::SqlitePool;

/// Register a new user
///
/// Creates the account and returns its id. No token is issued; clients log in through
/// `/auth/token` afterwards.
///
/// The account is written by a single `INSERT`. The lookups before it only pick the error
/// message; a concurrent registration that wins the race is still caught by the unique
/// columns.
///
/// ## Responses:
/// - `201 Created`: `{"message": ..., "user_id": ...}`.
/// - `400 Bad Request`: The email or username is already registered.
/// - `422 Unprocessable Entity`: A field is missing or has the wrong type.
#[post("/")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let input = register_data.into_inner();

    let email_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(&input.email)
        .fetch_optional(pool.get_ref())
        .await?;
    if email_taken.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let username_taken = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(&input.username)
        .fetch_optional(pool.get_ref())
        .await?;
    if username_taken.is_some() {
        return Err(AppError::BadRequest(USERNAME_TAKEN.into()));
    }

    let hashed_password = hash_password(&input.password, config.bcrypt_cost)?;

    let user_id = sqlx::query(
        "INSERT INTO users (username, email, first_name, last_name, role, hashed_password, is_active)
         VALUES (?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.role)
    .bind(&hashed_password)
    .execute(pool.get_ref())
    .await
    .map_err(registration_conflict)?
    .last_insert_rowid();

    log::info!(
        "registered user {} (id {}, role {})",
        input.username,
        user_id,
        input.role
    );

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User created successfully".to_string(),
        user_id,
    }))
}

const EMAIL_TAKEN: &str = "User with this email already exists";
const USERNAME_TAKEN: &str = "Username already taken";

/// Names the column behind a unique violation on `users`.
fn registration_conflict(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            if db_error.message().contains("users.email") {
                AppError::BadRequest(EMAIL_TAKEN.into())
            } else {
                AppError::BadRequest(USERNAME_TAKEN.into())
            }
        }
        _ => AppError::from(error),
    }
}

/// Login user
///
/// Exchanges a username and password, sent as an
/// `application/x-www-form-urlencoded` body, for a bearer token valid for the configured
/// lifetime.
///
/// ## Responses:
/// - `200 OK`: `{"access_token": ..., "token_type": "bearer"}`.
/// - `401 Unauthorized`: Unknown username or wrong password.
/// - `422 Unprocessable Entity`: `username` or `password` is missing.
#[post("/token")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    form: web::Form<TokenRequest>,
) -> Result<impl Responder, AppError> {
    let user = match authenticate(&pool, &form.username, &form.password).await {
        Ok(user) => user,
        Err(err) => {
            log::warn!("failed login for {:?}", form.username);
            return Err(err);
        }
    };

    let access_token = tokens.issue_access_token(&user.username, user.id, &user.role)?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}
