//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Access token presented by the browser or API client
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,

    #[sea_orm(has_many = "super::hidden_movie::Entity")]
    HiddenMovie,

    #[sea_orm(has_many = "super::petition::Entity")]
    Petition,

    #[sea_orm(has_many = "super::petition_vote::Entity")]
    PetitionVote,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::hidden_movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HiddenMovie.def()
    }
}

impl Related<super::petition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Petition.def()
    }
}

impl Related<super::petition_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetitionVote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
