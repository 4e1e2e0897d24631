//! Response helpers shared by the page handlers.

use axum::http::{HeaderMap, header};
use marquee_common::{AppError, AppResult};
use url::Url;

use crate::flash::FlashRedirect;

/// Recover from an authorization or validation failure with an error
/// message on the redirect target. Any other error ends the request.
pub fn recover(err: AppError, to: impl Into<String>) -> AppResult<FlashRedirect> {
    match err {
        AppError::Forbidden(message) | AppError::Validation(message) => {
            tracing::debug!(message = %message, "Recovered with flash message");
            Ok(FlashRedirect::to(to).error(message))
        }
        other => Err(other),
    }
}

/// Path and query of the `Referer` header, or `/`.
///
/// Only the path is kept so the redirect cannot leave the site. Leading
/// slashes collapse to one: `//host/..` is a protocol-relative location.
pub fn referer_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Url::parse(value).ok())
        .map_or_else(
            || "/".to_string(),
            |url| {
                let path = url.path().trim_start_matches(['/', '\\']);
                match url.query() {
                    Some(query) => format!("/{path}?{query}"),
                    None => format!("/{path}"),
                }
            },
        )
}

/// Movie detail page path.
pub fn movie_path(movie_id: &str) -> String {
    format!("/{movie_id}/")
}

/// Petition listing path.
pub const PETITIONS_PATH: &str = "/petitions/";
