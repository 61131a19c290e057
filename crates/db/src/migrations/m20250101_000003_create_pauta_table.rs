//! Create `pauta` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pauta::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pauta::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Pauta::AssemblyId).string_len(32).not_null())
                    .col(ColumnDef::new(Pauta::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Pauta::Description).text())
                    .col(
                        ColumnDef::new(Pauta::QuorumType)
                            .string_len(20)
                            .not_null()
                            .default("simple"),
                    )
                    .col(ColumnDef::new(Pauta::QuorumCustom).integer())
                    .col(ColumnDef::new(Pauta::OrderIndex).integer().not_null())
                    .col(
                        ColumnDef::new(Pauta::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Pauta::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Pauta::OpenedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Pauta::ClosedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pauta_assembly")
                            .from(Pauta::Table, Pauta::AssemblyId)
                            .to(Assembly::Table, Assembly::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (assembly_id, order_index) - concurrent creates cannot share a slot
        manager
            .create_index(
                Index::create()
                    .name("idx_pauta_assembly_order")
                    .table(Pauta::Table)
                    .col(Pauta::AssemblyId)
                    .col(Pauta::OrderIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pauta::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Pauta {
    Table,
    Id,
    AssemblyId,
    Title,
    Description,
    QuorumType,
    QuorumCustom,
    OrderIndex,
    Status,
    CreatedAt,
    OpenedAt,
    ClosedAt,
}

#[derive(Iden)]
enum Assembly {
    Table,
    Id,
}
