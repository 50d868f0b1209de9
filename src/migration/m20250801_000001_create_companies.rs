//! Migration: Create companies table and shared trigger function.
//!
//! One row per onboarding in progress. Also creates the shared
//! updated_at trigger function.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                -- Companies table: one onboarding in progress
                CREATE TABLE companies (
                    id UUID PRIMARY KEY,
                    email VARCHAR(320) NOT NULL,
                    customer_name VARCHAR(255) NOT NULL,
                    customer_first_name VARCHAR(255),
                    phone VARCHAR(64),
                    clickup_task_id VARCHAR(64) NOT NULL UNIQUE,
                    company_name VARCHAR(255) NOT NULL,
                    typeform_submission_id VARCHAR(64),
                    kyb_status VARCHAR(32) NOT NULL DEFAULT 'pending_documents'
                        CHECK (kyb_status IN ('pending_documents', 'documents_uploaded', 'processing', 'completed', 'failed')),
                    kyb_failure_reason TEXT,
                    first_upload_at TIMESTAMPTZ,
                    kyb_completed_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Index for looking up a company by its external task id
                CREATE INDEX idx_companies_clickup_task_id ON companies(clickup_task_id);

                -- Index for dashboards filtering by status
                CREATE INDEX idx_companies_kyb_status ON companies(kyb_status);

                -- Trigger to update updated_at
                CREATE TRIGGER update_companies_updated_at
                    BEFORE UPDATE ON companies
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TABLE IF EXISTS companies;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
