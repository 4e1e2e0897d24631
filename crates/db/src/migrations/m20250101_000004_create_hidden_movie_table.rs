//! Create hidden movie table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HiddenMovie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HiddenMovie::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HiddenMovie::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(HiddenMovie::MovieId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(HiddenMovie::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hidden_movie_user")
                            .from(HiddenMovie::Table, HiddenMovie::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hidden_movie_movie")
                            .from(HiddenMovie::Table, HiddenMovie::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, movie_id) - one flag per pair, also the
        // conflict target of the toggle insert
        manager
            .create_index(
                Index::create()
                    .name("idx_hidden_movie_user_movie")
                    .table(HiddenMovie::Table)
                    .col(HiddenMovie::UserId)
                    .col(HiddenMovie::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: movie_id (cascade deletes from movie)
        manager
            .create_index(
                Index::create()
                    .name("idx_hidden_movie_movie_id")
                    .table(HiddenMovie::Table)
                    .col(HiddenMovie::MovieId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HiddenMovie::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HiddenMovie {
    Table,
    Id,
    UserId,
    MovieId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
}
