//! Migration: Create upload_tokens table.
//!
//! The token string is the primary key: the uniqueness constraint backs up
//! the generator's entropy guarantee.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE upload_tokens (
                    token VARCHAR(64) PRIMARY KEY,
                    company_id UUID NOT NULL REFERENCES companies(id),
                    expires_at TIMESTAMPTZ NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for finding a company's tokens
                CREATE INDEX idx_upload_tokens_company_id ON upload_tokens(company_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS upload_tokens;")
            .await?;

        Ok(())
    }
}
