pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250115_000001_mods_table;
mod m20250122_000001_telemetry_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250115_000001_mods_table::Migration),
            Box::new(m20250122_000001_telemetry_table::Migration),
        ]
    }
}
