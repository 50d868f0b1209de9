//! Document OCR and retrieval endpoints.

use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::DocumentRecord;
use crate::services::{OcrDispatcher, Storage};

/// Run one OCR completion check for a document.
///
/// The background poll loop normally finishes jobs on its own; this endpoint
/// lets an operator (or a provider callback shim) drive completion manually.
/// Checking a document whose result was already applied is a no-op.
#[utoipa::path(
    post,
    path = "/api/v1/documents/{id}/ocr/check",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Current document state after the check", body = DocumentRecord),
        (status = 404, description = "Document not found", body = ErrorResponse)
    )
)]
#[post("/documents/{id}/ocr/check")]
pub async fn check_document_ocr(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<OcrDispatcher>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let doc = pool
        .get_document_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

    let updated = dispatcher.check_once(&doc).await?;

    Ok(HttpResponse::Ok().json(DocumentRecord::from(updated)))
}

/// Download a stored document for manual review.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/file",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The stored PDF", content_type = "application/pdf"),
        (status = 404, description = "Document or stored object not found", body = ErrorResponse)
    )
)]
#[get("/documents/{id}/file")]
pub async fn download_document(
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let doc = pool
        .get_document_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {}", id)))?;

    let data = storage.get_document(&doc.s3_key).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", doc.filename),
        ))
        .body(data))
}

/// Configure document routes.
pub fn configure_document_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(check_document_ocr).service(download_document);
}
