//! Petition service.

use chrono::{DateTime, FixedOffset};
use marquee_common::{AppError, AppResult, IdGenerator};
use marquee_db::{
    entities::{petition, petition_vote},
    repositories::{PetitionRepository, PetitionVoteRepository, PetitionWithVotes},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

const TITLE_REQUIRED_ON_CREATE: &str = "Please provide a title for your petition.";
const TITLE_REQUIRED_ON_UPDATE: &str = "Please provide a title.";
const TITLE_TOO_LONG: &str = "Title must be at most 255 characters.";
const NOT_OWNER_EDIT: &str = "You can only edit your own petition.";
const NOT_OWNER_DELETE: &str = "You can only delete your own petition.";

/// Outcome of comparing a petition's author with the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owner,
    NotOwner,
}

impl Ownership {
    /// Decide ownership by comparing the stored author id with the requester id.
    #[must_use]
    pub fn of(petition: &petition::Model, user_id: &str) -> Self {
        if petition.requested_by_id == user_id {
            Self::Owner
        } else {
            Self::NotOwner
        }
    }
}

/// Result of a yes vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    AlreadyVoted,
}

/// A petition row on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetitionSummary {
    pub id: String,
    pub title: String,
    pub reason: String,
    pub requested_by_id: String,
    pub requested_by: String,
    pub created_at: DateTime<FixedOffset>,
    pub yes_count: i64,
    /// Whether the viewer authored this petition (controls edit/delete links).
    pub is_own: bool,
}

impl PetitionSummary {
    fn from_row(row: PetitionWithVotes, viewer_id: &str) -> Self {
        Self {
            is_own: row.requested_by_id == viewer_id,
            id: row.id,
            title: row.title,
            reason: row.reason,
            requested_by_id: row.requested_by_id,
            requested_by: row.requested_by,
            created_at: row.created_at,
            yes_count: row.yes_count,
        }
    }
}

/// Submitted petition fields.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PetitionInput {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub title: String,
    #[serde(default)]
    pub reason: String,
}

impl PetitionInput {
    /// Trim both fields, rejecting a blank title with `required_message`.
    fn clean(&self, required_message: &str) -> AppResult<Self> {
        let cleaned = Self {
            title: self.title.trim().to_string(),
            reason: self.reason.trim().to_string(),
        };

        if cleaned.title.is_empty() {
            return Err(AppError::Validation(required_message.to_string()));
        }

        cleaned
            .validate()
            .map_err(|_| AppError::Validation(TITLE_TOO_LONG.to_string()))?;

        Ok(cleaned)
    }
}

/// Petition service.
#[derive(Clone)]
pub struct PetitionService {
    petition_repo: PetitionRepository,
    vote_repo: PetitionVoteRepository,
    id_gen: IdGenerator,
}

impl PetitionService {
    /// Create a new petition service.
    #[must_use]
    pub const fn new(petition_repo: PetitionRepository, vote_repo: PetitionVoteRepository) -> Self {
        Self {
            petition_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All petitions, newest first, with yes counts.
    pub async fn list(&self, viewer_id: &str) -> AppResult<Vec<PetitionSummary>> {
        let rows = self.petition_repo.list_with_vote_counts().await?;
        Ok(rows
            .into_iter()
            .map(|row| PetitionSummary::from_row(row, viewer_id))
            .collect())
    }

    /// Open a petition.
    pub async fn create(&self, user_id: &str, input: &PetitionInput) -> AppResult<petition::Model> {
        let input = input.clean(TITLE_REQUIRED_ON_CREATE)?;

        let model = petition::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            reason: Set(input.reason),
            requested_by_id: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let petition = self.petition_repo.create(model).await?;
        tracing::info!(petition_id = %petition.id, user_id = %user_id, "Created petition");
        Ok(petition)
    }

    /// Cast a yes vote. A repeat vote is reported, not counted.
    ///
    /// The existence check and insert share one transaction, and a duplicate
    /// insert is absorbed by the unique (`petition_id`, `user_id`) index, so
    /// concurrent repeats cannot double count.
    pub async fn vote_yes(&self, petition_id: &str, user_id: &str) -> AppResult<VoteOutcome> {
        let txn = self.vote_repo.begin().await?;

        if !self.petition_repo.exists_on(&txn, petition_id).await? {
            return Err(AppError::NotFound(format!(
                "Petition not found: {petition_id}"
            )));
        }

        let model = petition_vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            petition_id: Set(petition_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let inserted = self.vote_repo.insert_if_absent(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if inserted {
            tracing::info!(petition_id = %petition_id, user_id = %user_id, "Recorded yes vote");
            Ok(VoteOutcome::Recorded)
        } else {
            tracing::debug!(petition_id = %petition_id, user_id = %user_id, "Repeat yes vote ignored");
            Ok(VoteOutcome::AlreadyVoted)
        }
    }

    /// Number of yes votes on a petition.
    pub async fn vote_count(&self, petition_id: &str) -> AppResult<u64> {
        self.vote_repo.count_for_petition(petition_id).await
    }

    /// Load a petition for its author's edit form.
    pub async fn get_for_edit(&self, petition_id: &str, user_id: &str) -> AppResult<petition::Model> {
        self.get_owned(petition_id, user_id, NOT_OWNER_EDIT).await
    }

    /// Replace a petition's title and reason.
    pub async fn update(
        &self,
        petition_id: &str,
        user_id: &str,
        input: &PetitionInput,
    ) -> AppResult<petition::Model> {
        let petition = self.get_owned(petition_id, user_id, NOT_OWNER_EDIT).await?;
        let input = input.clean(TITLE_REQUIRED_ON_UPDATE)?;

        let mut active: petition::ActiveModel = petition.into();
        active.title = Set(input.title);
        active.reason = Set(input.reason);

        let petition = self.petition_repo.update(active).await?;
        tracing::info!(petition_id = %petition.id, user_id = %user_id, "Updated petition");
        Ok(petition)
    }

    /// Check that the user may delete a petition, without deleting it.
    pub async fn authorize_delete(&self, petition_id: &str, user_id: &str) -> AppResult<()> {
        self.get_owned(petition_id, user_id, NOT_OWNER_DELETE)
            .await
            .map(|_| ())
    }

    /// Delete a petition and, through the cascade, its votes.
    pub async fn delete(&self, petition_id: &str, user_id: &str) -> AppResult<()> {
        let petition = self.get_owned(petition_id, user_id, NOT_OWNER_DELETE).await?;
        self.petition_repo.delete(&petition.id).await?;
        tracing::info!(petition_id = %petition_id, user_id = %user_id, "Deleted petition");
        Ok(())
    }

    async fn get_owned(
        &self,
        petition_id: &str,
        user_id: &str,
        not_owner_message: &str,
    ) -> AppResult<petition::Model> {
        let petition = self.petition_repo.get_by_id(petition_id).await?;

        match Ownership::of(&petition, user_id) {
            Ownership::Owner => Ok(petition),
            Ownership::NotOwner => {
                tracing::debug!(petition_id = %petition_id, user_id = %user_id, "Rejected non-author");
                Err(AppError::Forbidden(not_owner_message.to_string()))
            }
        }
    }
}
