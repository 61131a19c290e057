//! Create `presence` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Presence::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Presence::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Presence::AssemblyId).string_len(32).not_null())
                    .col(ColumnDef::new(Presence::UnitId).string_len(32).not_null())
                    .col(ColumnDef::new(Presence::ConfirmedBy).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Presence::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presence_assembly")
                            .from(Presence::Table, Presence::AssemblyId)
                            .to(Assembly::Table, Assembly::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_presence_unit")
                            .from(Presence::Table, Presence::UnitId)
                            .to(Unit::Table, Unit::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (assembly_id, unit_id) - confirmation is idempotent
        manager
            .create_index(
                Index::create()
                    .name("idx_presence_assembly_unit")
                    .table(Presence::Table)
                    .col(Presence::AssemblyId)
                    .col(Presence::UnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Presence::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Presence {
    Table,
    Id,
    AssemblyId,
    UnitId,
    ConfirmedBy,
    ConfirmedAt,
}

#[derive(Iden)]
enum Assembly {
    Table,
    Id,
}

#[derive(Iden)]
enum Unit {
    Table,
    Id,
}
