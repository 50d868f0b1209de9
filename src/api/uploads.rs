//! Document upload endpoints, addressed by upload token.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::DocumentRecord;
use crate::services::{OcrDispatcher, Storage};

/// Multipart field name carrying the file.
const DOCUMENT_FIELD: &str = "document";

/// Successful upload response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: Uuid,
    /// Server-assigned filename (SSM_{n}.pdf).
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub message: String,
}

/// Upload status response for a token.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadStatusResponse {
    pub task_id: String,
    pub company_name: String,
    pub kyb_status: String,
    pub documents: Vec<DocumentRecord>,
    pub total_uploads: usize,
}

/// Upload one PDF document against an upload token.
///
/// The token must exist and be unexpired; the file must be a PDF within the
/// configured size cap. The stored object key embeds the new document id:
/// documents/customer-{company_id}/SSM_{n}_{document_id}.pdf.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{token}",
    tag = "Uploads",
    params(("token" = String, Path, description = "Upload token from the emailed link")),
    responses(
        (status = 200, description = "Document stored, OCR dispatched", body = UploadResponse),
        (status = 404, description = "Unknown or expired token", body = ErrorResponse),
        (status = 413, description = "File exceeds size cap", body = ErrorResponse),
        (status = 415, description = "Not a PDF", body = ErrorResponse),
        (status = 422, description = "No file in request", body = ErrorResponse)
    )
)]
#[post("/uploads/{token}")]
pub async fn upload_document(
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    dispatcher: web::Data<OcrDispatcher>,
    max_upload_size: web::Data<usize>,
    path: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let token = path.into_inner();

    // Token check happens before the body is read: an invalid token must
    // produce no document row and no stored object
    let token_row = pool.find_valid_token(&token).await?;

    let file = read_document_field(payload, **max_upload_size).await?;

    // The key embeds a fresh document id, so two concurrent uploads that
    // compute the same ordinal still store distinct objects
    let document_id = Uuid::new_v4();
    let ordinal = pool.count_documents_for_token(&token).await? + 1;
    let s3_key = Storage::document_key(token_row.company_id, document_id, ordinal);
    let filename = Storage::document_filename(ordinal);
    let file_size = file.len() as i64;

    storage.put_document(&s3_key, file).await?;

    let doc = pool
        .insert_document(
            document_id,
            token_row.company_id,
            &token,
            &s3_key,
            &filename,
            file_size,
        )
        .await?;

    pool.mark_first_upload(token_row.company_id).await?;
    pool.advance_company_status(
        token_row.company_id,
        crate::models::KybStatus::DocumentsUploaded,
        None,
    )
    .await?;

    info!(
        "Stored document {} ({} bytes) for company {}",
        doc.id, file_size, token_row.company_id
    );

    // Background OCR; the response does not wait for it
    dispatcher.dispatch(doc.clone());

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        document_id: doc.id,
        filename: doc.filename,
        uploaded_at: doc.uploaded_at,
        message: "Document uploaded successfully".to_string(),
    }))
}

/// List a token's documents and the owning company's KYB status.
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{token}/status",
    tag = "Uploads",
    params(("token" = String, Path, description = "Upload token")),
    responses(
        (status = 200, description = "Documents and statuses", body = UploadStatusResponse),
        (status = 404, description = "Unknown or expired token", body = ErrorResponse)
    )
)]
#[get("/uploads/{token}/status")]
pub async fn upload_status(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let token = path.into_inner();

    let token_row = pool.find_valid_token(&token).await?;
    let company = pool
        .get_company_by_id(token_row.company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {}", token_row.company_id)))?;

    let documents: Vec<DocumentRecord> = pool
        .list_documents_for_token(&token)
        .await?
        .into_iter()
        .map(DocumentRecord::from)
        .collect();

    Ok(HttpResponse::Ok().json(UploadStatusResponse {
        task_id: company.clickup_task_id,
        company_name: company.company_name,
        kyb_status: company.kyb_status,
        total_uploads: documents.len(),
        documents,
    }))
}

/// Read the `document` multipart field into memory, enforcing type and size.
async fn read_document_field(mut payload: Multipart, max_size: usize) -> AppResult<Vec<u8>> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            AppError::Validation(vec![format!("Malformed multipart body: {}", e)])
        })?;

        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        // Client filename is only used for the type check; the stored name
        // is server-assigned
        let client_filename = disposition.get_filename().unwrap_or_default().to_string();
        if !client_filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::UnsupportedFileType);
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| {
                AppError::Validation(vec![format!("Failed to read upload: {}", e)])
            })?;
            if buffer.len() + data.len() > max_size {
                return Err(AppError::PayloadTooLarge { max_bytes: max_size });
            }
            buffer.extend_from_slice(&data);
        }

        if buffer.is_empty() {
            return Err(AppError::Validation(vec!["document file is empty".to_string()]));
        }

        return Ok(buffer);
    }

    Err(AppError::Validation(vec![format!(
        "multipart field '{}' is required",
        DOCUMENT_FIELD
    )]))
}

/// Configure upload routes.
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_document).service(upload_status);
}
