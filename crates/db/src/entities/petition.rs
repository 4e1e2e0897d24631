//! Petition entity (user-submitted feature requests).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "petition")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    /// Empty when the requester gave no reason
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    #[sea_orm(indexed)]
    pub requested_by_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequestedById",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    RequestedBy,

    #[sea_orm(has_many = "super::petition_vote::Entity")]
    PetitionVote,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequestedBy.def()
    }
}

impl Related<super::petition_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetitionVote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
