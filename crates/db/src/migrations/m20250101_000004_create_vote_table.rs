//! Create `vote` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Vote::PautaId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UnitId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(Vote::Choice).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Vote::Origin)
                            .string_len(20)
                            .not_null()
                            .default("web"),
                    )
                    .col(ColumnDef::new(Vote::Ip).string_len(64))
                    .col(ColumnDef::new(Vote::UserAgent).text())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_pauta")
                            .from(Vote::Table, Vote::PautaId)
                            .to(Pauta::Table, Pauta::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_unit")
                            .from(Vote::Table, Vote::UnitId)
                            .to(Unit::Table, Unit::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (pauta_id, unit_id) - one vote per unit per pauta
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_pauta_unit")
                    .table(Vote::Table)
                    .col(Vote::PautaId)
                    .col(Vote::UnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    PautaId,
    UnitId,
    UserId,
    Choice,
    Origin,
    Ip,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Pauta {
    Table,
    Id,
}

#[derive(Iden)]
enum Unit {
    Table,
    Id,
}
