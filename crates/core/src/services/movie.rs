//! Movie catalog service.

use marquee_common::{AppError, AppResult, IdGenerator};
use marquee_db::{
    entities::{movie, review, user},
    repositories::{HiddenMovieRepository, MovieRepository, ReviewRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A review as shown on a movie page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewWithAuthor {
    pub id: String,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub user_id: String,
    pub author: String,
    /// Whether the viewer wrote this review (controls edit/delete links).
    pub is_own: bool,
}

impl ReviewWithAuthor {
    fn from_row((review, author): (review::Model, Option<user::Model>), viewer_id: Option<&str>) -> Self {
        Self {
            is_own: viewer_id == Some(review.user_id.as_str()),
            author: author.map(|u| u.username).unwrap_or_default(),
            id: review.id,
            comment: review.comment,
            created_at: review.created_at,
            user_id: review.user_id,
        }
    }
}

/// Everything the movie page needs.
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub reviews: Vec<ReviewWithAuthor>,
    /// Always `false` for anonymous viewers.
    pub is_hidden: bool,
}

/// Input for provisioning a movie.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovieInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i32,
    pub description: String,
    #[validate(length(max = 255))]
    pub image: String,
}

/// Movie catalog service.
#[derive(Clone)]
pub struct MovieService {
    movie_repo: MovieRepository,
    review_repo: ReviewRepository,
    hidden_repo: HiddenMovieRepository,
    id_gen: IdGenerator,
}

impl MovieService {
    /// Create a new movie service.
    #[must_use]
    pub const fn new(
        movie_repo: MovieRepository,
        review_repo: ReviewRepository,
        hidden_repo: HiddenMovieRepository,
    ) -> Self {
        Self {
            movie_repo,
            review_repo,
            hidden_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the catalog for a viewer.
    ///
    /// A blank search term lists everything. Movies the viewer has hidden
    /// are left out.
    pub async fn list(
        &self,
        viewer_id: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<Vec<movie::Model>> {
        let search = search.filter(|s| !s.trim().is_empty());
        self.movie_repo.list(search, viewer_id).await
    }

    /// Movie detail with reviews, newest first.
    pub async fn detail(&self, movie_id: &str, viewer_id: Option<&str>) -> AppResult<MovieDetail> {
        let movie = self.movie_repo.get_by_id(movie_id).await?;

        let reviews = self
            .review_repo
            .find_by_movie_with_authors(movie_id)
            .await?
            .into_iter()
            .map(|row| ReviewWithAuthor::from_row(row, viewer_id))
            .collect();

        let is_hidden = match viewer_id {
            Some(user_id) => self.hidden_repo.exists(user_id, movie_id).await?,
            None => false,
        };

        Ok(MovieDetail {
            movie,
            reviews,
            is_hidden,
        })
    }

    /// Add a movie to the catalog.
    pub async fn create(&self, input: CreateMovieInput) -> AppResult<movie::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let model = movie::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            price: Set(input.price),
            description: Set(input.description),
            image: Set(input.image),
        };

        let movie = self.movie_repo.create(model).await?;
        tracing::info!(movie = %movie, "Created movie");
        Ok(movie)
    }
}
