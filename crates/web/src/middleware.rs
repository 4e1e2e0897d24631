//! Application state and authentication middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use marquee_common::AppResult;
use marquee_core::{HiddenMovieService, MovieService, PetitionService, ReviewService, UserService};
use marquee_db::repositories::{
    HiddenMovieRepository, MovieRepository, PetitionRepository, PetitionVoteRepository,
    ReviewRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

use crate::templates::Templates;

/// Cookie holding the viewer's access token.
pub const TOKEN_COOKIE: &str = "marquee.token";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub movie_service: MovieService,
    pub review_service: ReviewService,
    pub hidden_movie_service: HiddenMovieService,
    pub petition_service: PetitionService,
    pub templates: Templates,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(db: Arc<DatabaseConnection>) -> AppResult<Self> {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let movie_repo = MovieRepository::new(Arc::clone(&db));
        let review_repo = ReviewRepository::new(Arc::clone(&db));
        let hidden_repo = HiddenMovieRepository::new(Arc::clone(&db));
        let petition_repo = PetitionRepository::new(Arc::clone(&db));
        let vote_repo = PetitionVoteRepository::new(db);

        Ok(Self {
            user_service: UserService::new(user_repo),
            movie_service: MovieService::new(
                movie_repo.clone(),
                review_repo.clone(),
                hidden_repo.clone(),
            ),
            review_service: ReviewService::new(review_repo, movie_repo.clone()),
            hidden_movie_service: HiddenMovieService::new(hidden_repo, movie_repo),
            petition_service: PetitionService::new(petition_repo, vote_repo),
            templates: Templates::new()?,
        })
    }
}

/// Bearer token from the `Authorization` header, else the token cookie.
fn request_token(req: &Request<Body>) -> Option<String> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    CookieJar::from_headers(req.headers())
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Authentication middleware.
///
/// Resolves the viewer and stores the user in request extensions. Unknown
/// tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Authenticated request");
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring unusable access token"),
        }
    }

    next.run(req).await
}
