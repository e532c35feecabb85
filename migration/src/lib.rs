pub use sea_orm_migration::prelude::*;

mod m20250301_090000_create_schema_and_base_db_setup;
mod m20250301_090500_base_migration;
mod m20250315_120000_add_meeting_listing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_090000_create_schema_and_base_db_setup::Migration),
            Box::new(m20250301_090500_base_migration::Migration),
            Box::new(m20250315_120000_add_meeting_listing_indexes::Migration),
        ]
    }
}
