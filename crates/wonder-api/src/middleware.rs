//! Cross-cutting layers for the router.
use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;

/// Largest accepted request body; uploads are photos.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Browser clients are served from other origins.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

pub fn body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_UPLOAD_BYTES)
}
