//! Create `unit` and `profile` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Unit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Unit::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Unit::CondoId).string_len(32).not_null())
                    .col(ColumnDef::new(Unit::Block).string_len(32))
                    .col(ColumnDef::new(Unit::Number).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Unit::IsDefaulter)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Unit::CreatedAt)
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
                    .name("idx_unit_condo_id")
                    .table(Unit::Table)
                    .col(Unit::CondoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profile::Id).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Profile::CondoId).string_len(32).not_null())
                    .col(ColumnDef::new(Profile::UnitId).string_len(32))
                    .col(
                        ColumnDef::new(Profile::Role)
                            .string_len(20)
                            .not_null()
                            .default("morador"),
                    )
                    .col(ColumnDef::new(Profile::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Profile::Token).string_len(128).unique_key())
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_unit")
                            .from(Profile::Table, Profile::UnitId)
                            .to(Unit::Table, Unit::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_condo_id")
                    .table(Profile::Table)
                    .col(Profile::CondoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Unit::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Unit {
    Table,
    Id,
    CondoId,
    Block,
    Number,
    IsDefaulter,
    CreatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    CondoId,
    UnitId,
    Role,
    Name,
    Token,
    CreatedAt,
}
