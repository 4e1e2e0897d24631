//! Petition and petition vote repositories.

use std::sync::Arc;

use crate::entities::{Petition, PetitionVote, petition, petition_vote, user};
use marquee_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, TransactionTrait, entity::prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
};
use serde::Serialize;

/// Petition row annotated with its author's username and yes-vote count.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct PetitionWithVotes {
    pub id: String,
    pub title: String,
    pub reason: String,
    pub requested_by_id: String,
    pub requested_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub yes_count: i64,
}

/// Petition repository for database operations.
#[derive(Clone)]
pub struct PetitionRepository {
    db: Arc<DatabaseConnection>,
}

impl PetitionRepository {
    /// Create a new petition repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a petition by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<petition::Model>> {
        Petition::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a petition by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<petition::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Petition not found: {id}")))
    }

    /// Check existence on an explicit connection (for use inside transactions).
    pub async fn exists_on<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<bool> {
        let count = Petition::find_by_id(id)
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// All petitions, newest first, each with its author and yes count.
    pub async fn list_with_vote_counts(&self) -> AppResult<Vec<PetitionWithVotes>> {
        Petition::find()
            .select_only()
            .columns([
                petition::Column::Id,
                petition::Column::Title,
                petition::Column::Reason,
                petition::Column::RequestedById,
                petition::Column::CreatedAt,
            ])
            .column_as(user::Column::Username, "requested_by")
            .column_as(
                Expr::col((petition_vote::Entity, petition_vote::Column::Id)).count(),
                "yes_count",
            )
            .join(JoinType::InnerJoin, petition::Relation::RequestedBy.def())
            .join(JoinType::LeftJoin, petition::Relation::PetitionVote.def())
            .group_by(petition::Column::Id)
            .group_by(user::Column::Username)
            .order_by_desc(petition::Column::CreatedAt)
            .order_by_desc(petition::Column::Id)
            .into_model::<PetitionWithVotes>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new petition.
    pub async fn create(&self, model: petition::ActiveModel) -> AppResult<petition::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a petition.
    pub async fn update(&self, model: petition::ActiveModel) -> AppResult<petition::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a petition. Its votes go with it through the foreign key cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Petition::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Petition vote repository for database operations.
#[derive(Clone)]
pub struct PetitionVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PetitionVoteRepository {
    /// Create a new petition vote repository.
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

    /// Count yes votes on a petition.
    pub async fn count_for_petition(&self, petition_id: &str) -> AppResult<u64> {
        PetitionVote::find()
            .filter(petition_vote::Column::PetitionId.eq(petition_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote unless the (petition, user) pair already voted.
    ///
    /// Returns `false` when the unique index absorbed the insert, including
    /// when a concurrent request won the race.
    pub async fn insert_if_absent<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: petition_vote::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = PetitionVote::insert(model)
            .on_conflict(
                OnConflict::columns([
                    petition_vote::Column::PetitionId,
                    petition_vote::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(inserted > 0)
    }
}
