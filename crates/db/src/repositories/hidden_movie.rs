//! Hidden movie repository.

use std::sync::Arc;

use crate::entities::{HiddenMovie, hidden_movie};
use marquee_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait, sea_query::OnConflict,
};

/// Hidden movie repository for database operations.
///
/// The write methods take an explicit connection so callers can run them
/// inside a transaction.
#[derive(Clone)]
pub struct HiddenMovieRepository {
    db: Arc<DatabaseConnection>,
}

impl HiddenMovieRepository {
    /// Create a new hidden movie repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user has hidden a movie.
    pub async fn exists(&self, user_id: &str, movie_id: &str) -> AppResult<bool> {
        let count = HiddenMovie::find()
            .filter(hidden_movie::Column::UserId.eq(user_id))
            .filter(hidden_movie::Column::MovieId.eq(movie_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Delete the flag for a pair. Returns the number of rows removed.
    pub async fn delete_by_pair<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        movie_id: &str,
    ) -> AppResult<u64> {
        let result = HiddenMovie::delete_many()
            .filter(hidden_movie::Column::UserId.eq(user_id))
            .filter(hidden_movie::Column::MovieId.eq(movie_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Insert the flag unless the pair already exists.
    ///
    /// Returns `false` when the unique (`user_id`, `movie_id`) index absorbed
    /// the insert.
    pub async fn insert_if_absent<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: hidden_movie::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = HiddenMovie::insert(model)
            .on_conflict(
                OnConflict::columns([hidden_movie::Column::UserId, hidden_movie::Column::MovieId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }
}
