//! Review service.

use marquee_common::{AppError, AppResult, IdGenerator};
use marquee_db::{
    entities::{movie, review},
    repositories::{MovieRepository, ReviewRepository},
};
use sea_orm::Set;
use validator::Validate;

const COMMENT_TOO_LONG: &str = "Review must be at most 255 characters.";

#[derive(Debug, Validate)]
struct CommentInput {
    #[validate(length(max = 255))]
    comment: String,
}

/// Trim a submitted comment. `None` means there is nothing to save.
fn clean_comment(comment: &str) -> AppResult<Option<String>> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Ok(None);
    }

    let input = CommentInput {
        comment: comment.to_string(),
    };
    input
        .validate()
        .map_err(|_| AppError::Validation(COMMENT_TOO_LONG.to_string()))?;

    Ok(Some(input.comment))
}

/// Review service. Every mutation is scoped to the review's owner.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    movie_repo: MovieRepository,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(review_repo: ReviewRepository, movie_repo: MovieRepository) -> Self {
        Self {
            review_repo,
            movie_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a review. A blank comment is skipped and yields `None`.
    pub async fn create(
        &self,
        movie_id: &str,
        user_id: &str,
        comment: &str,
    ) -> AppResult<Option<review::Model>> {
        self.movie_repo.get_by_id(movie_id).await?;

        let Some(comment) = clean_comment(comment)? else {
            tracing::debug!(movie_id = %movie_id, user_id = %user_id, "Skipped blank review");
            return Ok(None);
        };

        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            comment: Set(comment),
            created_at: Set(chrono::Utc::now().into()),
            movie_id: Set(movie_id.to_string()),
            user_id: Set(user_id.to_string()),
        };

        let review = self.review_repo.create(model).await?;
        tracing::info!(review_id = %review.id, movie_id = %movie_id, user_id = %user_id, "Created review");
        Ok(Some(review))
    }

    /// Load a review for its owner's edit form.
    ///
    /// A review owned by someone else, or attached to another movie, is
    /// reported as not found.
    pub async fn get_for_edit(
        &self,
        movie_id: &str,
        review_id: &str,
        user_id: &str,
    ) -> AppResult<(movie::Model, review::Model)> {
        let movie = self.movie_repo.get_by_id(movie_id).await?;
        let review = self.get_owned(movie_id, review_id, user_id).await?;
        Ok((movie, review))
    }

    /// Replace a review's comment. A blank comment changes nothing and
    /// yields `None`.
    pub async fn update(
        &self,
        movie_id: &str,
        review_id: &str,
        user_id: &str,
        comment: &str,
    ) -> AppResult<Option<review::Model>> {
        let review = self.get_owned(movie_id, review_id, user_id).await?;

        let Some(comment) = clean_comment(comment)? else {
            return Ok(None);
        };

        let mut active: review::ActiveModel = review.into();
        active.comment = Set(comment);

        let review = self.review_repo.update(active).await?;
        tracing::info!(review_id = %review.id, user_id = %user_id, "Updated review");
        Ok(Some(review))
    }

    /// Delete a review.
    pub async fn delete(&self, movie_id: &str, review_id: &str, user_id: &str) -> AppResult<()> {
        let review = self.get_owned(movie_id, review_id, user_id).await?;
        self.review_repo.delete(&review.id).await?;
        tracing::info!(review_id = %review_id, user_id = %user_id, "Deleted review");
        Ok(())
    }

    /// Count reviews of a movie.
    pub async fn count_for_movie(&self, movie_id: &str) -> AppResult<u64> {
        self.review_repo.count_by_movie(movie_id).await
    }

    async fn get_owned(
        &self,
        movie_id: &str,
        review_id: &str,
        user_id: &str,
    ) -> AppResult<review::Model> {
        self.review_repo
            .find_owned(review_id, movie_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review not found: {review_id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marquee_db::test_utils::TestDatabase;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: &Arc<sea_orm::DatabaseConnection>) -> ReviewService {
        ReviewService::new(
            ReviewRepository::new(Arc::clone(db)),
            MovieRepository::new(Arc::clone(db)),
        )
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(clean_comment("  Loved it \n").unwrap().as_deref(), Some("Loved it"));
        assert_eq!(clean_comment(" \t\n").unwrap(), None);
        assert!(clean_comment(&"x".repeat(255)).unwrap().is_some());

        let err = clean_comment(&"x".repeat(256)).unwrap_err();
        assert_eq!(err.to_string(), COMMENT_TOO_LONG);
    }

    #[tokio::test]
    async fn test_create_for_missing_movie() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<movie::Model>::new()])
                .into_connection(),
        );

        let result = service(&db).create("missing", "u1", "Great").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_whitespace_comment_leaves_count_unchanged() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let movie = db.insert_movie("Heat").await.unwrap();
        let reviews = service(&db.conn);

        let created = reviews.create(&movie.id, &alice.id, "   ").await.unwrap();

        assert!(created.is_none());
        assert_eq!(reviews.count_for_movie(&movie.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_trims_comment() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let movie = db.insert_movie("Heat").await.unwrap();

        let review = service(&db.conn)
            .create(&movie.id, &alice.id, "  Tense.  ")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(review.comment, "Tense.");
        assert_eq!(review.user_id, alice.id);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_edit_or_delete() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let bob = db.insert_user("bob").await.unwrap();
        let movie = db.insert_movie("Heat").await.unwrap();
        let reviews = service(&db.conn);

        let review = reviews
            .create(&movie.id, &alice.id, "Mine")
            .await
            .unwrap()
            .unwrap();

        let edit = reviews.get_for_edit(&movie.id, &review.id, &bob.id).await;
        assert!(matches!(edit, Err(AppError::NotFound(_))));

        let update = reviews
            .update(&movie.id, &review.id, &bob.id, "Hijacked")
            .await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        let delete = reviews.delete(&movie.id, &review.id, &bob.id).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        let (_, unchanged) = reviews
            .get_for_edit(&movie.id, &review.id, &alice.id)
            .await
            .unwrap();
        assert_eq!(unchanged.comment, "Mine");
    }

    #[tokio::test]
    async fn test_review_is_scoped_to_its_movie() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let heat = db.insert_movie("Heat").await.unwrap();
        let alien = db.insert_movie("Alien").await.unwrap();
        let reviews = service(&db.conn);

        let review = reviews
            .create(&heat.id, &alice.id, "Tense")
            .await
            .unwrap()
            .unwrap();

        let result = reviews.get_for_edit(&alien.id, &review.id, &alice.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_update_and_delete() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let movie = db.insert_movie("Heat").await.unwrap();
        let reviews = service(&db.conn);

        let review = reviews
            .create(&movie.id, &alice.id, "First take")
            .await
            .unwrap()
            .unwrap();

        let blank = reviews
            .update(&movie.id, &review.id, &alice.id, "  ")
            .await
            .unwrap();
        assert!(blank.is_none());

        let updated = reviews
            .update(&movie.id, &review.id, &alice.id, "Second take")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.comment, "Second take");
        assert_eq!(updated.created_at, review.created_at);

        reviews.delete(&movie.id, &review.id, &alice.id).await.unwrap();
        assert_eq!(reviews.count_for_movie(&movie.id).await.unwrap(), 0);
    }
}
