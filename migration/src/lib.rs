pub use sea_orm_migration::prelude::*;

mod util;
mod m20251001_090000_init_ledger;
mod m20251001_091500_seed_ledger;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_090000_init_ledger::Migration),
            Box::new(m20251001_091500_seed_ledger::Migration),
        ]
    }
}
