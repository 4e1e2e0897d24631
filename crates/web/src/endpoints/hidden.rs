//! Hidden movie endpoints.

use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Html,
    routing::{get, post},
};
use marquee_common::AppResult;
use marquee_core::HideToggle;
use tera::Context;

use crate::{
    extractors::AuthUser,
    flash::{FlashRedirect, IncomingFlash},
    middleware::AppState,
    response::referer_path,
};

/// Toggle the viewer's hidden flag and go back where they came from.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<FlashRedirect> {
    let outcome = state
        .hidden_movie_service
        .toggle(&movie_id, &user.id)
        .await?;

    let message = match &outcome {
        HideToggle::Hidden(movie) => format!("\"{}\" hidden.", movie.name),
        HideToggle::Unhidden(movie) => format!("\"{}\" un-hidden.", movie.name),
    };

    Ok(FlashRedirect::to(referer_path(&headers)).info(message))
}

/// The viewer's hidden movies.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Html<String>> {
    let movies = state.hidden_movie_service.list(&user.id).await?;

    let mut context = Context::new();
    context.insert("movies", &movies);

    state.templates.render(
        "hidden_list.html",
        "Hidden Movies",
        Some(user.username.as_str()),
        &messages,
        context,
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hidden/", get(list))
        .route("/{movie_id}/hide-toggle/", post(toggle))
}
