pub use sea_orm_migration::prelude::*;

mod m20240210_153056_create_schema_and_base_db_setup;
mod m20251015_000001_create_users_table;
mod m20251015_000002_create_notifications_table;
mod m20251015_000003_add_notifications_recipient_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240210_153056_create_schema_and_base_db_setup::Migration),
            Box::new(m20251015_000001_create_users_table::Migration),
            Box::new(m20251015_000002_create_notifications_table::Migration),
            Box::new(m20251015_000003_add_notifications_recipient_index::Migration),
        ]
    }
}
