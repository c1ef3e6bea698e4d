//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_courses;
mod m20260301_000003_create_cards;
mod m20260301_000004_create_favorites;
mod m20260301_000005_create_study_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_courses::Migration),
            Box::new(m20260301_000003_create_cards::Migration),
            Box::new(m20260301_000004_create_favorites::Migration),
            Box::new(m20260301_000005_create_study_history::Migration),
        ]
    }
}
