//! Create `audit_log` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign keys: entries must outlive the rows they describe
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLog::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(AuditLog::CondoId).string_len(32).not_null())
                    .col(ColumnDef::new(AuditLog::AssemblyId).string_len(32))
                    .col(ColumnDef::new(AuditLog::EventType).string_len(40).not_null())
                    .col(ColumnDef::new(AuditLog::ActorId).string_len(64).not_null())
                    .col(ColumnDef::new(AuditLog::ActorRole).string_len(20).not_null())
                    .col(ColumnDef::new(AuditLog::TargetType).string_len(32).not_null())
                    .col(ColumnDef::new(AuditLog::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(AuditLog::Details).json_binary().not_null())
                    .col(ColumnDef::new(AuditLog::Ip).string_len(64))
                    .col(ColumnDef::new(AuditLog::UserAgent).text())
                    .col(
                        ColumnDef::new(AuditLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (assembly_id, created_at) for the forward-only read path
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_assembly_created")
                    .table(AuditLog::Table)
                    .col(AuditLog::AssemblyId)
                    .col(AuditLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_log_target")
                    .table(AuditLog::Table)
                    .col(AuditLog::TargetType)
                    .col(AuditLog::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditLog {
    Table,
    Id,
    CondoId,
    AssemblyId,
    EventType,
    ActorId,
    ActorRole,
    TargetType,
    TargetId,
    Details,
    Ip,
    UserAgent,
    CreatedAt,
}
