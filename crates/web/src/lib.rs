//! HTTP layer for marquee.
//!
//! Server-rendered pages over the core services:
//!
//! - **Endpoints**: catalog, reviews, hidden movies, petitions
//! - **Extractors**: authenticated and optional viewer
//! - **Middleware**: token authentication, flash messages
//! - **Templates**: Tera pages compiled into the binary

pub mod endpoints;
pub mod extractors;
pub mod flash;
pub mod middleware;
pub mod response;
pub mod templates;

use std::path::Path;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};
use tower_http::services::ServeDir;

pub use endpoints::router;
pub use middleware::AppState;

/// Build the application: pages, auth and flash middleware, and `/media`.
pub fn app(state: AppState, media_root: &Path) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn(flash::flash_middleware))
        .nest_service("/media", ServeDir::new(media_root))
        .with_state(state)
}
