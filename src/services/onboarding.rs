//! The core onboarding workflow behind the inbound webhook.
//!
//! Sequence: validate → generate token → persist company + token →
//! update ClickUp → send email → acknowledge. Validation short-circuits
//! before any external call; persistence failure aborts the workflow;
//! ClickUp and SendGrid failures are logged and surfaced as partial success
//! but never undo the created record.

use tracing::{info, warn};

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{KybStatus, ValidatedSignup, WebhookPayload, WebhookResponse};
use crate::services::clickup::ClickUpClient;
use crate::services::email::EmailClient;
use crate::services::token::generate_upload_token;

/// Onboarding workflow service.
#[derive(Clone)]
pub struct OnboardingService {
    db: DbPool,
    clickup: ClickUpClient,
    email: EmailClient,
    public_base_url: String,
    token_ttl_hours: i64,
}

impl OnboardingService {
    pub fn new(config: &Config, db: DbPool, clickup: ClickUpClient, email: EmailClient) -> Self {
        Self {
            db,
            clickup,
            email,
            public_base_url: config.public_base_url.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }

    /// Handle one webhook payload end to end.
    pub async fn handle_signup(&self, payload: WebhookPayload) -> AppResult<WebhookResponse> {
        // Pure guard: a rejected payload must leave no trace anywhere
        let signup = payload.validate().map_err(AppError::Validation)?;

        let token = generate_upload_token();
        let upload_link = format!("{}/upload/{}", self.public_base_url, token);

        // Persistence failure aborts: nothing downstream can run without the row
        let company = self.db.insert_company(&signup).await?;
        self.db
            .insert_upload_token(&token, company.id, self.token_ttl_hours)
            .await?;

        info!(
            "Created company {} for task {} ({})",
            company.id, signup.clickup_task_id, signup.company_name
        );

        let clickup_updated = self.notify_clickup(&signup, &upload_link).await;
        let email_sent = self.notify_customer(&signup, &upload_link).await;

        Ok(WebhookResponse {
            success: true,
            task_id: signup.clickup_task_id.clone(),
            task_url: signup.task_url(),
            upload_link,
            customer_token: token,
            customer_record_id: company.id,
            email_sent,
            clickup_updated,
            message: format!(
                "Upload link generated and emailed to {} - {}",
                signup.customer_name, signup.company_name
            ),
            customer_record: company.into(),
        })
    }

    /// Best-effort ClickUp updates: initial status comment plus the link.
    async fn notify_clickup(&self, signup: &ValidatedSignup, upload_link: &str) -> bool {
        if !self.clickup.is_enabled() {
            return false;
        }

        let status_result = self
            .clickup
            .post_kyb_status(
                &signup.clickup_task_id,
                KybStatus::PendingDocuments,
                Some(&signup.customer_email),
            )
            .await;
        if let Err(e) = &status_result {
            warn!("ClickUp status update failed (non-fatal): {}", e);
        }

        let link_result = self
            .clickup
            .post_upload_link(&signup.clickup_task_id, upload_link, signup)
            .await;
        if let Err(e) = &link_result {
            warn!("ClickUp upload-link comment failed (non-fatal): {}", e);
        }

        status_result.is_ok() && link_result.is_ok()
    }

    /// Best-effort customer email.
    async fn notify_customer(&self, signup: &ValidatedSignup, upload_link: &str) -> bool {
        match self
            .email
            .send_upload_link(
                &signup.customer_email,
                &signup.customer_name,
                upload_link,
                &signup.company_name,
            )
            .await
        {
            Ok(sent) => sent,
            Err(e) => {
                warn!("Upload-link email failed (non-fatal): {}", e);
                false
            }
        }
    }
}
