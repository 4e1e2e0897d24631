//! Movie repository.

use std::sync::Arc;

use crate::entities::{HiddenMovie, Movie, hidden_movie, movie};
use marquee_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, Func, LikeExpr, Query},
};

/// Movie repository for database operations.
#[derive(Clone)]
pub struct MovieRepository {
    db: Arc<DatabaseConnection>,
}

/// Escape LIKE metacharacters so the term matches literally, lower-cased.
///
/// Case folding is only as wide as the backend's `lower()`: `PostgreSQL`
/// folds all of Unicode, `SQLite` folds ASCII only. Non-ASCII letters still
/// match on `SQLite` when typed in the same case as the stored name.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl MovieRepository {
    /// Create a new movie repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a movie by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<movie::Model>> {
        Movie::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a movie by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<movie::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie not found: {id}")))
    }

    /// List movies in natural (id) order.
    ///
    /// `search` filters by case-insensitive substring of the name.
    /// `hidden_for` excludes every movie that user has hidden.
    pub async fn list(
        &self,
        search: Option<&str>,
        hidden_for: Option<&str>,
    ) -> AppResult<Vec<movie::Model>> {
        let mut query = Movie::find().order_by_asc(movie::Column::Id);

        if let Some(term) = search {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((Movie, movie::Column::Name))))
                    .like(LikeExpr::new(contains_pattern(term)).escape('\\')),
            );
        }

        if let Some(user_id) = hidden_for {
            query = query.filter(
                movie::Column::Id.not_in_subquery(
                    Query::select()
                        .column(hidden_movie::Column::MovieId)
                        .from(HiddenMovie)
                        .and_where(hidden_movie::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Movies hidden by a user, ordered by name.
    pub async fn find_hidden_by_user(&self, user_id: &str) -> AppResult<Vec<movie::Model>> {
        Movie::find()
            .inner_join(HiddenMovie)
            .filter(hidden_movie::Column::UserId.eq(user_id))
            .order_by_asc(movie::Column::Name)
            .order_by_asc(movie::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new movie.
    pub async fn create(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
