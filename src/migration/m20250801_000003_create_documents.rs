//! Migration: Create documents table.

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
                CREATE TABLE documents (
                    id UUID PRIMARY KEY,
                    company_id UUID NOT NULL REFERENCES companies(id),
                    upload_token VARCHAR(64) NOT NULL REFERENCES upload_tokens(token),
                    s3_key VARCHAR(512) NOT NULL,
                    filename VARCHAR(255) NOT NULL,
                    file_size BIGINT NOT NULL,
                    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    ocr_status VARCHAR(32) NOT NULL DEFAULT 'pending'
                        CHECK (ocr_status IN ('pending', 'processing', 'completed', 'failed')),
                    textract_job_id VARCHAR(128),
                    ocr_started_at TIMESTAMPTZ,
                    ocr_completed_at TIMESTAMPTZ,
                    ocr_failure_reason TEXT,

                    -- Structured OCR output, schema depends on document type
                    -- {company_name, registration_number, incorporation_date,
                    --  company_type, business_address, business_phone, directors}
                    extracted_fields JSONB
                );

                -- Index for listing a company's documents
                CREATE INDEX idx_documents_company_id ON documents(company_id);

                -- Index for listing uploads by token
                CREATE INDEX idx_documents_upload_token ON documents(upload_token);

                -- Index for the OCR poll loop picking up in-flight jobs
                CREATE INDEX idx_documents_ocr_status ON documents(ocr_status)
                    WHERE ocr_status IN ('pending', 'processing');
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS documents;")
            .await?;

        Ok(())
    }
}
