pub mod admin;
pub mod auth;
pub mod health;
pub mod todos;
pub mod users;

use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::{web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus the body-parsing error handlers.
///
/// `/auth/`, `/auth/token`, `/todos/` and `/health` are public. Everything else sits
/// behind `AuthMiddleware`. The application must also register `web::Data` for the
/// `SqlitePool`, `Config` and `TokenService`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::FormConfig::default().error_handler(form_error))
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login),
        )
        .service(
            web::scope("/todos").service(todos::list_todos).service(
                web::scope("/todo")
                    .wrap(AuthMiddleware)
                    .service(todos::create_todo)
                    .service(todos::get_todo)
                    .service(todos::update_todo)
                    .service(todos::delete_todo),
            ),
        )
        .service(
            web::scope("/users")
                .wrap(AuthMiddleware)
                .service(users::get_user)
                .service(users::change_password),
        )
        .service(
            web::scope("/Admin")
                .wrap(AuthMiddleware)
                .service(admin::list_all_todos),
        );
}

/// A body that parses but does not fit the request schema (missing field, wrong type) is a
/// validation failure. Broken JSON, a wrong content type or an oversized body stays a 400.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(ref inner) if inner.is_data() => {
            AppError::ValidationError(err.to_string()).into()
        }
        _ => AppError::BadRequest(err.to_string()).into(),
    }
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        UrlencodedError::Parse(_) => AppError::ValidationError(err.to_string()).into(),
        _ => AppError::BadRequest(err.to_string()).into(),
    }
}
