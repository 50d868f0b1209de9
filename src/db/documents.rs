//! Database queries for document records.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::document::{self, ActiveModel, Column, Entity as Document};
use crate::error::{AppError, AppResult};
use crate::models::{ExtractedFields, OcrStatus};

use super::DbPool;

impl DbPool {
    /// Insert a new document record for an uploaded file.
    ///
    /// The id is caller-supplied because the S3 key embeds it; key and row
    /// must agree.
    pub async fn insert_document(
        &self,
        id: Uuid,
        company_id: Uuid,
        upload_token: &str,
        s3_key: &str,
        filename: &str,
        file_size: i64,
    ) -> AppResult<document::Model> {
        let model = ActiveModel {
            id: Set(id),
            company_id: Set(company_id),
            upload_token: Set(upload_token.to_string()),
            s3_key: Set(s3_key.to_string()),
            filename: Set(filename.to_string()),
            file_size: Set(file_size),
            uploaded_at: Set(Utc::now()),
            ocr_status: Set(OcrStatus::Pending.as_str().to_string()),
            textract_job_id: Set(None),
            ocr_started_at: Set(None),
            ocr_completed_at: Set(None),
            ocr_failure_reason: Set(None),
            extracted_fields: Set(None),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert document: {}", e)))?;

        Ok(result)
    }

    /// Get a document by id.
    pub async fn get_document_by_id(&self, id: Uuid) -> AppResult<Option<document::Model>> {
        let result = Document::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get document: {}", e)))?;

        Ok(result)
    }

    /// Count documents already uploaded for a token (used for the filename ordinal).
    pub async fn count_documents_for_token(&self, token: &str) -> AppResult<u64> {
        let count = Document::find()
            .filter(Column::UploadToken.eq(token))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count documents: {}", e)))?;

        Ok(count)
    }

    /// List a token's documents, newest first.
    pub async fn list_documents_for_token(&self, token: &str) -> AppResult<Vec<document::Model>> {
        let rows = Document::find()
            .filter(Column::UploadToken.eq(token))
            .order_by_desc(Column::UploadedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list documents: {}", e)))?;

        Ok(rows)
    }

    /// Record a started Textract job on the document.
    pub async fn mark_document_processing(
        &self,
        id: Uuid,
        textract_job_id: &str,
    ) -> AppResult<document::Model> {
        let row = self
            .get_document_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

        let mut active: ActiveModel = row.into();
        active.ocr_status = Set(OcrStatus::Processing.as_str().to_string());
        active.textract_job_id = Set(Some(textract_job_id.to_string()));
        active.ocr_started_at = Set(Some(Utc::now()));

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark document processing: {}", e)))?;

        Ok(result)
    }

    /// Store OCR results and mark the document completed.
    ///
    /// No-op if the document is already terminal: a re-delivered completion
    /// must not overwrite stored results or resurrect a failed document.
    pub async fn complete_document_ocr(
        &self,
        id: Uuid,
        fields: &ExtractedFields,
    ) -> AppResult<document::Model> {
        let row = self
            .get_document_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

        if OcrStatus::parse(&row.ocr_status).is_some_and(|s| s.is_terminal()) {
            tracing::debug!("Document {} already terminal, dropping OCR result", id);
            return Ok(row);
        }

        let mut active: ActiveModel = row.into();
        active.ocr_status = Set(OcrStatus::Completed.as_str().to_string());
        active.ocr_completed_at = Set(Some(Utc::now()));
        active.extracted_fields = Set(fields.to_json());

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to store OCR results: {}", e)))?;

        Ok(result)
    }

    /// Record a terminal OCR failure with its reason.
    ///
    /// No-op if the document is already terminal.
    pub async fn fail_document_ocr(&self, id: Uuid, reason: &str) -> AppResult<document::Model> {
        let row = self
            .get_document_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

        if OcrStatus::parse(&row.ocr_status).is_some_and(|s| s.is_terminal()) {
            return Ok(row);
        }

        let mut active: ActiveModel = row.into();
        active.ocr_status = Set(OcrStatus::Failed.as_str().to_string());
        active.ocr_completed_at = Set(Some(Utc::now()));
        active.ocr_failure_reason = Set(Some(reason.to_string()));

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to record OCR failure: {}", e)))?;

        Ok(result)
    }
}
