//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_unit_and_profile_tables;
mod m20250101_000002_create_assembly_table;
mod m20250101_000003_create_pauta_table;
mod m20250101_000004_create_vote_table;
mod m20250101_000005_create_presence_table;
mod m20250101_000006_create_audit_log_table;
mod m20250101_000007_create_enquete_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_unit_and_profile_tables::Migration),
            Box::new(m20250101_000002_create_assembly_table::Migration),
            Box::new(m20250101_000003_create_pauta_table::Migration),
            Box::new(m20250101_000004_create_vote_table::Migration),
            Box::new(m20250101_000005_create_presence_table::Migration),
            Box::new(m20250101_000006_create_audit_log_table::Migration),
            Box::new(m20250101_000007_create_enquete_tables::Migration),
        ]
    }
}
