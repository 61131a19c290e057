//! Create `enquete`, `enquete_option` and `enquete_vote` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enquete::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Enquete::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Enquete::CondoId).string_len(32).not_null())
                    .col(ColumnDef::new(Enquete::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Enquete::Description).text())
                    .col(
                        ColumnDef::new(Enquete::OneVotePerUnit)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Enquete::StartAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enquete::EndAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enquete::CreatedBy).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Enquete::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enquete_condo_id")
                    .table(Enquete::Table)
                    .col(Enquete::CondoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnqueteOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnqueteOption::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnqueteOption::EnqueteId).string_len(32).not_null())
                    .col(ColumnDef::new(EnqueteOption::Label).string_len(256).not_null())
                    .col(ColumnDef::new(EnqueteOption::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enquete_option_enquete")
                            .from(EnqueteOption::Table, EnqueteOption::EnqueteId)
                            .to(Enquete::Table, Enquete::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enquete_option_enquete_id")
                    .table(EnqueteOption::Table)
                    .col(EnqueteOption::EnqueteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnqueteVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnqueteVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EnqueteVote::EnqueteId).string_len(32).not_null())
                    .col(ColumnDef::new(EnqueteVote::OptionId).string_len(32).not_null())
                    .col(ColumnDef::new(EnqueteVote::UnitId).string_len(32).not_null())
                    .col(ColumnDef::new(EnqueteVote::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(EnqueteVote::ExclusiveUnitId).string_len(32))
                    .col(
                        ColumnDef::new(EnqueteVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enquete_vote_enquete")
                            .from(EnqueteVote::Table, EnqueteVote::EnqueteId)
                            .to(Enquete::Table, Enquete::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enquete_vote_option")
                            .from(EnqueteVote::Table, EnqueteVote::OptionId)
                            .to(EnqueteOption::Table, EnqueteOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (enquete_id, exclusive_unit_id) - nulls are distinct,
        // so only one-vote-per-unit enquetes are constrained
        manager
            .create_index(
                Index::create()
                    .name("idx_enquete_vote_exclusive_unit")
                    .table(EnqueteVote::Table)
                    .col(EnqueteVote::EnqueteId)
                    .col(EnqueteVote::ExclusiveUnitId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enquete_vote_option_id")
                    .table(EnqueteVote::Table)
                    .col(EnqueteVote::OptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EnqueteVote::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EnqueteOption::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Enquete::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Enquete {
    Table,
    Id,
    CondoId,
    Title,
    Description,
    OneVotePerUnit,
    StartAt,
    EndAt,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum EnqueteOption {
    Table,
    Id,
    EnqueteId,
    Label,
    Position,
}

#[derive(Iden)]
enum EnqueteVote {
    Table,
    Id,
    EnqueteId,
    OptionId,
    UnitId,
    UserId,
    ExclusiveUnitId,
    CreatedAt,
}
