//! Create movie table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movie::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movie::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Movie::Price).integer().not_null())
                    .col(ColumnDef::new(Movie::Description).text().not_null())
                    .col(ColumnDef::new(Movie::Image).string_len(255).not_null())
                    .to_owned(),
            )
            .await?;

        // Index: name (hidden list ordering, admin lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_name")
                    .table(Movie::Table)
                    .col(Movie::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
    Name,
    Price,
    Description,
    Image,
}
