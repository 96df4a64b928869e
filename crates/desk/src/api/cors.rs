//! Origin guard
//!
//! Cross-origin headers are only emitted for a fixed set of local
//! development origins. A denied origin gets no CORS headers but the request
//! is still handled; the browser is what blocks the response.

use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, request::Parts, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origins allowed to read responses cross-origin
///
/// `null` is what browsers send for pages opened from the file system.
pub const ALLOWED_ORIGINS: [&str; 7] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:5500",
    "http://127.0.0.1:5500",
    "null",
];

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Decide whether a request origin is allowed
///
/// An absent origin (same-origin or non-browser client) is always allowed.
pub fn is_allowed_origin(origin: Option<&str>) -> bool {
    match origin {
        None => true,
        Some(origin) => ALLOWED_ORIGINS.contains(&origin),
    }
}

/// CORS middleware enforcing [`ALLOWED_ORIGINS`]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| is_allowed_origin(Some(origin)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE)
}
