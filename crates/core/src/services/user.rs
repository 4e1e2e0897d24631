//! User service.

use marquee_common::{AppError, AppResult, IdGenerator};
use marquee_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use validator::Validate;

#[derive(Debug, Validate)]
struct CreateUserInput {
    #[validate(length(min = 1, max = 150))]
    username: String,
}

/// User service: token lookup and provisioning.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve the user holding an access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Provision a user with a fresh access token.
    pub async fn create(&self, username: &str) -> AppResult<user::Model> {
        let input = CreateUserInput {
            username: username.trim().to_string(),
        };
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username already taken: {}",
                input.username
            )));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            token: Some(format!("{username}-token")),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_token() {
        let user = create_test_user("u1", "alice");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let found = service.authenticate_by_token("alice-token").await.unwrap();

        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate_by_token("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.create("alice").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_username() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db));
        let result = service.create("   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
