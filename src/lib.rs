#![doc = "The `tickbox` library crate."]
#![doc = ""]
#![doc = "A multi-user to-do list service: JWT bearer authentication, per-owner to-do CRUD,"]
#![doc = "self-service password changes and an admin-only listing. `main.rs` loads the"]
#![doc = "configuration, opens the database and mounts `routes::config` on an actix-web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::config::Config;
pub use crate::error::AppError;
