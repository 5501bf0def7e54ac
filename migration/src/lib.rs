pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_profiles;
mod m20251001_000002_create_prizes;
mod m20251001_000003_create_engagement;
mod m20251001_000004_create_settings_and_seasons;
mod m20251101_000005_add_rescue_and_password_reset;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_profiles::Migration),
            Box::new(m20251001_000002_create_prizes::Migration),
            Box::new(m20251001_000003_create_engagement::Migration),
            Box::new(m20251001_000004_create_settings_and_seasons::Migration),
            Box::new(m20251101_000005_add_rescue_and_password_reset::Migration),
        ]
    }
}
