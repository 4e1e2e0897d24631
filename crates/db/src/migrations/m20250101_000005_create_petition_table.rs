//! Create petition table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Petition::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Petition::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Petition::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Petition::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Petition::RequestedById)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Petition::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_petition_requested_by")
                            .from(Petition::Table, Petition::RequestedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (default listing order, newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_petition_created_at")
                    .table(Petition::Table)
                    .col(Petition::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_petition_requested_by_id")
                    .table(Petition::Table)
                    .col(Petition::RequestedById)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Petition::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Petition {
    Table,
    Id,
    Title,
    Reason,
    RequestedById,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
