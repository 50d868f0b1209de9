//! ClickUp task-system client.
//!
//! Posts status comments and the generated upload link onto the task the
//! workflow orchestrator created. The whole component is best-effort: the
//! API token is optional configuration, and callers treat every failure as
//! non-fatal for the onboarding workflow.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ClickUpSettings;
use crate::error::{AppError, AppResult};
use crate::models::{KybStatus, ValidatedSignup};

/// ClickUp REST API base URL.
const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";

/// HTTP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP total timeout per request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ClickUp client. Disabled (no-op) when no API token is configured.
#[derive(Clone)]
pub struct ClickUpClient {
    api_token: Option<SecretString>,
    base_url: String,
    http_client: reqwest::Client,
}

impl ClickUpClient {
    /// Create a client from settings.
    pub fn new(settings: &ClickUpSettings) -> Self {
        if settings.api_token.is_none() {
            info!("ClickUp API token not configured; task updates will be skipped");
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for ClickUp");

        Self {
            api_token: settings.api_token.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Whether task updates are enabled.
    pub fn is_enabled(&self) -> bool {
        self.api_token.is_some()
    }

    /// Post the generated upload link onto the task as a comment.
    ///
    /// Returns Ok(false) when the client is disabled.
    pub async fn post_upload_link(
        &self,
        task_id: &str,
        upload_link: &str,
        signup: &ValidatedSignup,
    ) -> AppResult<bool> {
        let comment = upload_link_comment(upload_link, signup);
        self.add_comment(task_id, &comment).await
    }

    /// Post a KYB status change onto the task: a comment plus the task's
    /// "KYB Status" custom field when the task carries one.
    ///
    /// The custom-field write is best-effort on top of the comment; a task
    /// without the field, or a rejected field update, does not fail the call.
    pub async fn post_kyb_status(
        &self,
        task_id: &str,
        status: KybStatus,
        customer_email: Option<&str>,
    ) -> AppResult<bool> {
        let comment = kyb_status_comment(status, customer_email);
        let posted = self.add_comment(task_id, &comment).await?;

        if posted {
            if let Err(e) = self.set_kyb_status_field(task_id, status).await {
                warn!(
                    "ClickUp custom-field update for task {} failed (non-fatal): {}",
                    task_id, e
                );
            }
        }

        Ok(posted)
    }

    /// Set the task's "KYB Status" custom field to the given status.
    ///
    /// Field ids are per-workspace, so the task is fetched first to locate
    /// the field and, for dropdowns, translate the status into an option
    /// index. A task without the field is skipped silently.
    async fn set_kyb_status_field(&self, task_id: &str, status: KybStatus) -> AppResult<()> {
        let Some(ref token) = self.api_token else {
            return Ok(());
        };

        let fields = self.get_task_custom_fields(task_id, token).await?;
        let Some((field_id, value)) = resolve_kyb_field_update(&fields, status) else {
            info!("ClickUp task {} has no KYB Status custom field, skipping", task_id);
            return Ok(());
        };

        let url = format!("{}/task/{}/field/{}", self.base_url, task_id, field_id);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", token.expose_secret())
            .json(&serde_json::json!({ "value": value }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService {
                service: "clickup",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status_code = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService {
                service: "clickup",
                message: format!("{}: {}", status_code, text),
            });
        }

        info!("Updated KYB Status field on ClickUp task {} to {}", task_id, status);
        Ok(())
    }

    /// Fetch the task's custom-field definitions.
    async fn get_task_custom_fields(
        &self,
        task_id: &str,
        token: &SecretString,
    ) -> AppResult<Vec<CustomField>> {
        let url = format!("{}/task/{}", self.base_url, task_id);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::ExternalService {
                service: "clickup",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status_code = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService {
                service: "clickup",
                message: format!("{}: {}", status_code, text),
            });
        }

        let task: TaskFields = response.json().await.map_err(|e| AppError::ExternalService {
            service: "clickup",
            message: format!("Malformed task response: {}", e),
        })?;

        Ok(task.custom_fields)
    }

    /// POST a comment to the task. Repeating the call with the same link can
    /// at worst duplicate a comment; ClickUp owns actual idempotence.
    async fn add_comment(&self, task_id: &str, comment_text: &str) -> AppResult<bool> {
        let Some(ref token) = self.api_token else {
            return Ok(false);
        };

        let url = format!("{}/task/{}/comment", self.base_url, task_id);
        let body = serde_json::json!({
            "comment_text": comment_text,
            "notify_all": false,
        });

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService {
                service: "clickup",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("ClickUp comment on task {} rejected: {} {}", task_id, status, text);
            return Err(AppError::ExternalService {
                service: "clickup",
                message: format!("{}: {}", status, text),
            });
        }

        info!("Posted comment to ClickUp task {}", task_id);
        Ok(true)
    }
}

/// Subset of the ClickUp task response we care about.
#[derive(Debug, Deserialize)]
struct TaskFields {
    #[serde(default)]
    custom_fields: Vec<CustomField>,
}

/// One custom-field definition on a task.
#[derive(Debug, Deserialize)]
struct CustomField {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    field_type: String,
    #[serde(default)]
    type_config: Option<TypeConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TypeConfig {
    #[serde(default)]
    options: Vec<DropdownOption>,
}

#[derive(Debug, Deserialize)]
struct DropdownOption {
    #[serde(default)]
    name: String,
}

/// Name the task's status field may go by.
const KYB_FIELD_NAMES: &[&str] = &["kyb status", "kyb_status"];

/// Locate the KYB Status field and compute the value to write.
///
/// Dropdown fields take the option index, matched against the status's
/// display name (exact first, then substring). Any other field type takes
/// the raw status string. Returns None when the task has no such field or
/// the dropdown has no usable option.
fn resolve_kyb_field_update(
    fields: &[CustomField],
    status: KybStatus,
) -> Option<(String, serde_json::Value)> {
    let field = fields
        .iter()
        .find(|f| KYB_FIELD_NAMES.contains(&f.name.to_lowercase().as_str()))?;

    if field.field_type != "drop_down" {
        return Some((field.id.clone(), serde_json::json!(status.as_str())));
    }

    let options = field.type_config.as_ref().map(|c| c.options.as_slice())?;
    let wanted = kyb_dropdown_name(status).to_lowercase();

    let index = options
        .iter()
        .position(|o| o.name.to_lowercase() == wanted)
        .or_else(|| {
            options.iter().position(|o| {
                let name = o.name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
        })?;

    Some((field.id.clone(), serde_json::json!(index)))
}

/// Display name the ClickUp dropdown uses for each status.
fn kyb_dropdown_name(status: KybStatus) -> &'static str {
    match status {
        KybStatus::PendingDocuments => "pending documents",
        KybStatus::DocumentsUploaded => "documents uploaded",
        KybStatus::Processing => "processing",
        KybStatus::Completed => "Completed",
        KybStatus::Failed => "Failed",
    }
}

/// Build the upload-link comment body.
fn upload_link_comment(upload_link: &str, signup: &ValidatedSignup) -> String {
    format!(
        "**Upload Link Generated**\n\n\
         Customer: {} ({})\n\
         Company: {}\n\n\
         **Secure Upload Link:** {}\n\n\
         **Next Steps:**\n\
         1. Upload link sent to customer via email\n\
         2. Waiting for customer to upload KYB documents\n\
         3. OCR processing and validation\n\
         4. Manual review and approval\n\n\
         *This link has been automatically generated and sent to the customer.*",
        signup.customer_name, signup.customer_email, signup.company_name, upload_link
    )
}

/// Build the KYB status comment body.
fn kyb_status_comment(status: KybStatus, customer_email: Option<&str>) -> String {
    let (title, message) = match status {
        KybStatus::PendingDocuments => (
            "KYB: Awaiting Documents",
            "Customer has been notified. Waiting for document upload.",
        ),
        KybStatus::DocumentsUploaded => (
            "KYB: Documents Received",
            "Documents uploaded successfully. OCR processing queued.",
        ),
        KybStatus::Processing => (
            "KYB: Processing Documents",
            "Documents are being processed and validated.",
        ),
        KybStatus::Completed => (
            "KYB: COMPLETED",
            "Customer KYB verification has been completed successfully!",
        ),
        KybStatus::Failed => (
            "KYB: FAILED",
            "KYB verification failed. Customer may need to resubmit documents.",
        ),
    };

    let mut comment = format!(
        "**{}**\n\n**Status:** {}\n\n{}",
        title,
        status.as_str().to_uppercase(),
        message
    );

    if let Some(email) = customer_email {
        comment.push_str(&format!("\n**Customer:** {}", email));
    }

    comment.push_str("\n\n*Automated update from KYB system*");
    comment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signup() -> ValidatedSignup {
        ValidatedSignup {
            customer_name: "Test Customer Auto".to_string(),
            customer_email: "admin@swipey.co".to_string(),
            company_name: "AutoTest Solutions Bhd".to_string(),
            clickup_task_id: "task_autotest_001".to_string(),
            customer_first_name: None,
            phone: None,
            typeform_response_id: None,
            clickup_task_url: None,
        }
    }

    #[test]
    fn test_upload_link_comment_contains_link_and_customer() {
        let comment = upload_link_comment("https://x.test/upload/tok123", &test_signup());
        assert!(comment.contains("https://x.test/upload/tok123"));
        assert!(comment.contains("Test Customer Auto"));
        assert!(comment.contains("AutoTest Solutions Bhd"));
    }

    #[test]
    fn test_kyb_status_comment_shape() {
        let comment = kyb_status_comment(KybStatus::Completed, Some("admin@swipey.co"));
        assert!(comment.contains("KYB: COMPLETED"));
        assert!(comment.contains("**Status:** COMPLETED"));
        assert!(comment.contains("admin@swipey.co"));
    }

    fn dropdown_field(id: &str, name: &str, options: &[&str]) -> CustomField {
        CustomField {
            id: id.to_string(),
            name: name.to_string(),
            field_type: "drop_down".to_string(),
            type_config: Some(TypeConfig {
                options: options
                    .iter()
                    .map(|o| DropdownOption { name: o.to_string() })
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_kyb_field_dropdown_resolves_to_option_index() {
        let fields = vec![
            dropdown_field("f-ocr", "OCR Status", &["pending", "completed"]),
            dropdown_field(
                "f-kyb",
                "KYB Status",
                &["pending documents", "documents uploaded", "processing", "Completed", "Failed"],
            ),
        ];

        let (id, value) = resolve_kyb_field_update(&fields, KybStatus::Completed).unwrap();
        assert_eq!(id, "f-kyb");
        assert_eq!(value, serde_json::json!(3));
    }

    #[test]
    fn test_kyb_field_dropdown_partial_match() {
        let fields = vec![dropdown_field("f-kyb", "kyb_status", &["Docs", "KYB Failed"])];

        let (id, value) = resolve_kyb_field_update(&fields, KybStatus::Failed).unwrap();
        assert_eq!(id, "f-kyb");
        assert_eq!(value, serde_json::json!(1));
    }

    #[test]
    fn test_kyb_field_non_dropdown_takes_raw_status() {
        let fields = vec![CustomField {
            id: "f-text".to_string(),
            name: "KYB Status".to_string(),
            field_type: "text".to_string(),
            type_config: None,
        }];

        let (id, value) = resolve_kyb_field_update(&fields, KybStatus::Processing).unwrap();
        assert_eq!(id, "f-text");
        assert_eq!(value, serde_json::json!("processing"));
    }

    #[test]
    fn test_missing_kyb_field_resolves_to_none() {
        let fields = vec![dropdown_field("f-ocr", "OCR Status", &["pending"])];
        assert!(resolve_kyb_field_update(&fields, KybStatus::Completed).is_none());

        let no_option = vec![dropdown_field("f-kyb", "KYB Status", &["unrelated"])];
        assert!(resolve_kyb_field_update(&no_option, KybStatus::Processing).is_none());
    }

    #[test]
    fn test_disabled_client_is_a_noop() {
        let client = ClickUpClient::new(&ClickUpSettings { api_token: None })
            .with_base_url("http://localhost:1");
        assert!(!client.is_enabled());

        // No token means no request is attempted, even against a dead endpoint
        let result = tokio_test_block_on(client.post_kyb_status(
            "task_1",
            KybStatus::PendingDocuments,
            None,
        ));
        assert!(matches!(result, Ok(false)));
    }

    fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f)
    }
}
