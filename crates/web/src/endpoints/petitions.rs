//! Petition endpoints.
//!
//! Authorization and validation failures redirect with an error message
//! instead of failing the request.

use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use marquee_common::{AppError, AppResult};
use marquee_core::{PetitionInput, VoteOutcome};
use tera::Context;

use crate::{
    extractors::AuthUser,
    flash::{FlashRedirect, IncomingFlash},
    middleware::AppState,
    response::{PETITIONS_PATH, recover},
};

fn edit_path(petition_id: &str) -> String {
    format!("/petitions/{petition_id}/edit/")
}

/// All petitions with their yes counts.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Html<String>> {
    let petitions = state.petition_service.list(&user.id).await?;

    let mut context = Context::new();
    context.insert("petitions", &petitions);

    state.templates.render(
        "petitions_list.html",
        "Petitions",
        Some(user.username.as_str()),
        &messages,
        context,
    )
}

/// Open a petition.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Form(form): Form<PetitionInput>,
) -> AppResult<FlashRedirect> {
    match state.petition_service.create(&user.id, &form).await {
        Ok(_) => Ok(FlashRedirect::to(PETITIONS_PATH).success("Petition created.")),
        Err(e) => recover(e, PETITIONS_PATH),
    }
}

/// Cast a yes vote.
async fn vote_yes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(petition_id): Path<String>,
) -> AppResult<FlashRedirect> {
    let redirect = FlashRedirect::to(PETITIONS_PATH);

    match state.petition_service.vote_yes(&petition_id, &user.id).await? {
        VoteOutcome::Recorded => Ok(redirect.success("Your vote has been recorded.")),
        VoteOutcome::AlreadyVoted => Ok(redirect.info("You already voted Yes on this petition.")),
    }
}

/// Edit form for the viewer's own petition.
async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(petition_id): Path<String>,
    IncomingFlash(messages): IncomingFlash,
) -> AppResult<Response> {
    let petition = match state
        .petition_service
        .get_for_edit(&petition_id, &user.id)
        .await
    {
        Ok(petition) => petition,
        Err(e) => return recover(e, PETITIONS_PATH).map(IntoResponse::into_response),
    };

    let mut context = Context::new();
    context.insert("petition", &petition);

    let page = state.templates.render(
        "edit_petition.html",
        "Edit Petition",
        Some(user.username.as_str()),
        &messages,
        context,
    )?;
    Ok(page.into_response())
}

/// Save an edited petition. A blank title sends the author back to the form.
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(petition_id): Path<String>,
    Form(form): Form<PetitionInput>,
) -> AppResult<FlashRedirect> {
    match state
        .petition_service
        .update(&petition_id, &user.id, &form)
        .await
    {
        Ok(_) => Ok(FlashRedirect::to(PETITIONS_PATH).success("Petition updated.")),
        Err(AppError::Validation(message)) => {
            Ok(FlashRedirect::to(edit_path(&petition_id)).error(message))
        }
        Err(e) => recover(e, PETITIONS_PATH),
    }
}

/// Read intent: check ownership, never delete.
async fn delete_check(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(petition_id): Path<String>,
) -> AppResult<FlashRedirect> {
    match state
        .petition_service
        .authorize_delete(&petition_id, &user.id)
        .await
    {
        Ok(()) => Ok(FlashRedirect::to(PETITIONS_PATH)),
        Err(e) => recover(e, PETITIONS_PATH),
    }
}

/// Delete the viewer's own petition.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(petition_id): Path<String>,
) -> AppResult<FlashRedirect> {
    match state.petition_service.delete(&petition_id, &user.id).await {
        Ok(()) => Ok(FlashRedirect::to(PETITIONS_PATH).success("Petition deleted.")),
        Err(e) => recover(e, PETITIONS_PATH),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/petitions/", get(list).post(create))
        .route("/petitions/{petition_id}/vote-yes/", post(vote_yes))
        .route(
            "/petitions/{petition_id}/edit/",
            get(edit_form).post(edit),
        )
        .route(
            "/petitions/{petition_id}/delete/",
            get(delete_check).post(delete),
        )
}
