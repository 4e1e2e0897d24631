//! Create petition vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PetitionVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PetitionVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PetitionVote::PetitionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PetitionVote::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PetitionVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_petition_vote_petition")
                            .from(PetitionVote::Table, PetitionVote::PetitionId)
                            .to(Petition::Table, Petition::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_petition_vote_user")
                            .from(PetitionVote::Table, PetitionVote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (petition_id, user_id) - one yes per user, also the
        // conflict target of the vote insert
        manager
            .create_index(
                Index::create()
                    .name("idx_petition_vote_petition_user")
                    .table(PetitionVote::Table)
                    .col(PetitionVote::PetitionId)
                    .col(PetitionVote::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_petition_vote_user_id")
                    .table(PetitionVote::Table)
                    .col(PetitionVote::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PetitionVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PetitionVote {
    Table,
    Id,
    PetitionId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Petition {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
