//! Review endpoints.

use axum::{
    Form, Router,
    extract::{Path, State},
    response::Html,
    routing::{get, post},
};
use marquee_common::AppResult;
use serde::Deserialize;
use tera::Context;

use crate::{
    extractors::AuthUser,
    flash::{FlashRedirect, IncomingFlash},
    middleware::AppState,
    response::{movie_path, recover},
};

/// Submitted review form.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub comment: String,
}

/// Post a review. A blank comment is dropped without a message.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> AppResult<FlashRedirect> {
    let back = movie_path(&movie_id);

    match state
        .review_service
        .create(&movie_id, &user.id, &form.comment)
        .await
    {
        Ok(Some(_)) => Ok(FlashRedirect::to(back).success("Review added.")),
        Ok(None) => Ok(FlashRedirect::to(back)),
        Err(e) => recover(e, back),
    }
}

/// Edit form for the viewer's own review.
async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(String, String)>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Html<String>> {
    let (movie, review) = state
        .review_service
        .get_for_edit(&movie_id, &review_id, &user.id)
        .await?;

    let mut context = Context::new();
    context.insert("movie", &movie);
    context.insert("review", &review);

    state.templates.render(
        "edit_review.html",
        "Edit Review",
        Some(user.username.as_str()),
        &messages,
        context,
    )
}

/// Save an edited review.
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(String, String)>,
    Form(form): Form<ReviewForm>,
) -> AppResult<FlashRedirect> {
    let back = movie_path(&movie_id);

    match state
        .review_service
        .update(&movie_id, &review_id, &user.id, &form.comment)
        .await
    {
        Ok(Some(_)) => Ok(FlashRedirect::to(back).success("Review updated.")),
        Ok(None) => Ok(FlashRedirect::to(back)),
        Err(e) => recover(e, back),
    }
}

/// Delete the viewer's own review.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((movie_id, review_id)): Path<(String, String)>,
) -> AppResult<FlashRedirect> {
    state
        .review_service
        .delete(&movie_id, &review_id, &user.id)
        .await?;

    Ok(FlashRedirect::to(movie_path(&movie_id)).success("Review deleted."))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{movie_id}/review/create/", post(create))
        .route(
            "/{movie_id}/review/{review_id}/edit/",
            get(edit_form).post(edit),
        )
        .route("/{movie_id}/review/{review_id}/delete/", post(delete))
}
