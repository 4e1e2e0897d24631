//! Catalog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use marquee_common::AppResult;
use serde::Deserialize;
use tera::Context;

use crate::{extractors::MaybeAuthUser, flash::IncomingFlash, middleware::AppState};

/// Catalog query string.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Movie list, without the viewer's hidden movies.
async fn index(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Html<String>> {
    let movies = state
        .movie_service
        .list(viewer.id(), query.search.as_deref())
        .await?;

    let mut context = Context::new();
    context.insert("movies", &movies);
    context.insert("search", query.search.as_deref().unwrap_or_default());

    state
        .templates
        .render("index.html", "Movies", viewer.username(), &messages, context)
}

/// Movie detail page.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Html<String>> {
    let detail = state.movie_service.detail(&movie_id, viewer.id()).await?;

    let mut context = Context::new();
    context.insert("movie", &detail.movie);
    context.insert("reviews", &detail.reviews);
    context.insert("is_hidden", &detail.is_hidden);

    state.templates.render(
        "show.html",
        &detail.movie.name,
        viewer.username(),
        &messages,
        context,
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{movie_id}/", get(show))
}
