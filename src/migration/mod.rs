//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250801_000001_create_companies;
mod m20250801_000002_create_upload_tokens;
mod m20250801_000003_create_documents;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_companies::Migration),
            Box::new(m20250801_000002_create_upload_tokens::Migration),
            Box::new(m20250801_000003_create_documents::Migration),
        ]
    }
}
