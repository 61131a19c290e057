//! Create `assembly` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assembly::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assembly::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Assembly::CondoId).string_len(32).not_null())
                    .col(ColumnDef::new(Assembly::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Assembly::Description).text())
                    .col(
                        ColumnDef::new(Assembly::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assembly::MeetingLink).string_len(1024))
                    .col(
                        ColumnDef::new(Assembly::RequirePresence)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assembly::BlockDefaulters)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assembly::Status)
                            .string_len(20)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(Assembly::MinutesUrl).string_len(1024))
                    .col(ColumnDef::new(Assembly::CreatedBy).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Assembly::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Assembly::OpenedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Assembly::ClosedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: (condo_id, scheduled_at) for listing a condominium's assemblies
        manager
            .create_index(
                Index::create()
                    .name("idx_assembly_condo_scheduled")
                    .table(Assembly::Table)
                    .col(Assembly::CondoId)
                    .col(Assembly::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assembly::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Assembly {
    Table,
    Id,
    CondoId,
    Title,
    Description,
    ScheduledAt,
    MeetingLink,
    RequirePresence,
    BlockDefaulters,
    Status,
    MinutesUrl,
    CreatedBy,
    CreatedAt,
    OpenedAt,
    ClosedAt,
}
