//! Page endpoints.

mod hidden;
mod movies;
mod petitions;
mod reviews;

use axum::Router;

use crate::middleware::AppState;

/// Create the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(movies::router())
        .merge(reviews::router())
        .merge(hidden::router())
        .merge(petitions::router())
}
