//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KYB Onboarding Server",
        version = "0.1.0",
        description = "Webhook-driven customer onboarding: upload links, document intake, OCR extraction"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Webhook
        api::webhook::zapier_webhook,
        // Uploads
        api::uploads::upload_document,
        api::uploads::upload_status,
        // Documents
        api::documents::check_document_ocr,
        api::documents::download_document,
        // Companies
        api::companies::get_company,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            error::ValidationErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Webhook
            models::webhook::WebhookPayload,
            models::webhook::WebhookResponse,
            // Uploads
            api::uploads::UploadResponse,
            api::uploads::UploadStatusResponse,
            // Records
            models::company::CompanyRecord,
            models::company::KybStatus,
            models::document::DocumentRecord,
            models::document::OcrStatus,
            models::document::ExtractedFields,
            models::document::Director,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Webhooks", description = "Inbound workflow-orchestrator webhooks"),
        (name = "Uploads", description = "Token-addressed document uploads"),
        (name = "Documents", description = "OCR status and results"),
        (name = "Companies", description = "Company record lookups")
    )
)]
pub struct ApiDoc;
