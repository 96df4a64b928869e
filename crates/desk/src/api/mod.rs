//! HTTP API for the desk

pub mod cors;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

pub use cors::{cors_layer, is_allowed_origin, ALLOWED_ORIGINS};
pub use error::ApiError;
pub use routes::create_router;
