//! Hidden movie service.

use marquee_common::{AppError, AppResult, IdGenerator};
use marquee_db::{
    entities::{hidden_movie, movie},
    repositories::{HiddenMovieRepository, MovieRepository},
};
use sea_orm::Set;

/// Result of toggling a movie's hidden flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideToggle {
    /// The movie is now hidden from the user's catalog.
    Hidden(movie::Model),
    /// The movie is visible again.
    Unhidden(movie::Model),
}

impl HideToggle {
    /// The toggled movie.
    #[must_use]
    pub const fn movie(&self) -> &movie::Model {
        match self {
            Self::Hidden(movie) | Self::Unhidden(movie) => movie,
        }
    }

    /// Whether the movie ended up hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden(_))
    }
}

/// Per-user movie visibility service.
#[derive(Clone)]
pub struct HiddenMovieService {
    hidden_repo: HiddenMovieRepository,
    movie_repo: MovieRepository,
    id_gen: IdGenerator,
}

impl HiddenMovieService {
    /// Create a new hidden movie service.
    #[must_use]
    pub const fn new(hidden_repo: HiddenMovieRepository, movie_repo: MovieRepository) -> Self {
        Self {
            hidden_repo,
            movie_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the hidden flag for (user, movie).
    ///
    /// Delete and conditional insert share one transaction. If a concurrent
    /// request inserted the same pair first, the insert is absorbed by the
    /// unique index and the movie is still reported as hidden.
    pub async fn toggle(&self, movie_id: &str, user_id: &str) -> AppResult<HideToggle> {
        let movie = self.movie_repo.get_by_id(movie_id).await?;

        let txn = self.hidden_repo.begin().await?;

        let removed = self
            .hidden_repo
            .delete_by_pair(&txn, user_id, movie_id)
            .await?;

        if removed == 0 {
            let model = hidden_movie::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                movie_id: Set(movie_id.to_string()),
                created_at: Set(chrono::Utc::now().into()),
            };
            let inserted = self.hidden_repo.insert_if_absent(&txn, model).await?;
            if !inserted {
                tracing::debug!(movie_id = %movie_id, user_id = %user_id, "Hide already recorded");
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if removed == 0 {
            tracing::info!(movie_id = %movie_id, user_id = %user_id, "Movie hidden");
            Ok(HideToggle::Hidden(movie))
        } else {
            tracing::info!(movie_id = %movie_id, user_id = %user_id, "Movie un-hidden");
            Ok(HideToggle::Unhidden(movie))
        }
    }

    /// Movies the user has hidden, by name.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<movie::Model>> {
        self.movie_repo.find_hidden_by_user(user_id).await
    }

    /// Check whether the user has hidden a movie.
    pub async fn is_hidden(&self, movie_id: &str, user_id: &str) -> AppResult<bool> {
        self.hidden_repo.exists(user_id, movie_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marquee_db::test_utils::TestDatabase;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: &Arc<sea_orm::DatabaseConnection>) -> HiddenMovieService {
        HiddenMovieService::new(
            HiddenMovieRepository::new(Arc::clone(db)),
            MovieRepository::new(Arc::clone(db)),
        )
    }

    fn create_test_movie(id: &str) -> movie::Model {
        movie::Model {
            id: id.to_string(),
            name: "Heat".to_string(),
            price: 8,
            description: "Heist".to_string(),
            image: "movie_images/heat.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_toggle_missing_movie() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<movie::Model>::new()])
                .into_connection(),
        );

        let result = service(&db).toggle("missing", "u1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_existing_flag_unhides() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_movie("m1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let outcome = service(&db).toggle("m1", "u1").await.unwrap();

        assert_eq!(outcome, HideToggle::Unhidden(create_test_movie("m1")));
    }

    #[tokio::test]
    async fn test_toggle_missing_flag_hides() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_movie("m1")]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let outcome = service(&db).toggle("m1", "u1").await.unwrap();

        assert!(outcome.is_hidden());
        assert_eq!(outcome.movie().id, "m1");
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let movie = db.insert_movie("Heat").await.unwrap();
        let hidden = service(&db.conn);

        assert!(!hidden.is_hidden(&movie.id, &alice.id).await.unwrap());

        assert!(hidden.toggle(&movie.id, &alice.id).await.unwrap().is_hidden());
        assert!(hidden.is_hidden(&movie.id, &alice.id).await.unwrap());

        assert!(!hidden.toggle(&movie.id, &alice.id).await.unwrap().is_hidden());
        assert!(!hidden.is_hidden(&movie.id, &alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_hidden_movie_excluded_only_for_that_user() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let bob = db.insert_user("bob").await.unwrap();
        let heat = db.insert_movie("Heat").await.unwrap();
        let alien = db.insert_movie("Alien").await.unwrap();

        service(&db.conn).toggle(&heat.id, &alice.id).await.unwrap();

        let movies = MovieRepository::new(db.connection());
        let for_alice = movies.list(None, Some(&alice.id)).await.unwrap();
        let for_bob = movies.list(None, Some(&bob.id)).await.unwrap();

        assert_eq!(for_alice, vec![alien]);
        assert!(for_bob.contains(&heat));
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.insert_user("alice").await.unwrap();
        let zodiac = db.insert_movie("Zodiac").await.unwrap();
        let alien = db.insert_movie("Alien").await.unwrap();
        let hidden = service(&db.conn);

        hidden.toggle(&zodiac.id, &alice.id).await.unwrap();
        hidden.toggle(&alien.id, &alice.id).await.unwrap();

        let names: Vec<_> = hidden
            .list(&alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Alien", "Zodiac"]);
    }
}
