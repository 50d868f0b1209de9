//! Inbound webhook endpoint for the workflow orchestrator.

use actix_web::{HttpResponse, post, web};
use tracing::info;

use crate::error::{AppResult, ValidationErrorResponse};
use crate::models::{WebhookPayload, WebhookResponse};
use crate::services::OnboardingService;

/// Receive a customer signup from Zapier.
///
/// Zapier has already created the ClickUp task; this endpoint validates the
/// payload, creates the company record with an upload token, posts the link
/// back to the task, and emails the customer.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/zapier",
    tag = "Webhooks",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Signup processed; check email_sent/clickup_updated for partial success", body = WebhookResponse),
        (status = 422, description = "Payload missing required fields", body = ValidationErrorResponse),
        (status = 500, description = "Company record could not be persisted")
    )
)]
#[post("/webhooks/zapier")]
pub async fn zapier_webhook(
    onboarding: web::Data<OnboardingService>,
    payload: web::Json<WebhookPayload>,
) -> AppResult<HttpResponse> {
    let response = onboarding.handle_signup(payload.into_inner()).await?;

    info!(
        "Webhook processed for task {} (record {}, email_sent={}, clickup_updated={})",
        response.task_id, response.customer_record_id, response.email_sent, response.clickup_updated
    );

    Ok(HttpResponse::Ok().json(response))
}

/// Configure webhook routes.
pub fn configure_webhook_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(zapier_webhook);
}
