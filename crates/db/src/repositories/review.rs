//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, User, review, user};
use marquee_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review that belongs to both the given movie and owner.
    pub async fn find_owned(
        &self,
        id: &str,
        movie_id: &str,
        user_id: &str,
    ) -> AppResult<Option<review::Model>> {
        Review::find_by_id(id)
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reviews of a movie with their authors, newest first.
    pub async fn find_by_movie_with_authors(
        &self,
        movie_id: &str,
    ) -> AppResult<Vec<(review::Model, Option<user::Model>)>> {
        Review::find()
            .find_also_related(User)
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reviews of a movie.
    pub async fn count_by_movie(&self, movie_id: &str) -> AppResult<u64> {
        Review::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a review.
    pub async fn update(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a review.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Review::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
