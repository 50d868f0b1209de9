//! Inbound webhook DTOs for the workflow orchestrator (Zapier).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CompanyRecord;

/// Fields that must be present and non-empty on every webhook payload.
pub const REQUIRED_FIELDS: &[&str] = &[
    "customer_name",
    "customer_email",
    "company_name",
    "clickup_task_id",
];

/// Customer signup payload delivered by Zapier after the ClickUp task is
/// created. Optional fields are passed through as-is.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WebhookPayload {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub clickup_task_id: Option<String>,
    #[serde(default)]
    pub customer_first_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub typeform_response_id: Option<String>,
    #[serde(default)]
    pub clickup_task_url: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub submission_timestamp: Option<String>,
}

/// The required subset after validation. Holding validated owned strings keeps
/// the workflow free of repeated Option unwrapping.
#[derive(Debug, Clone)]
pub struct ValidatedSignup {
    pub customer_name: String,
    pub customer_email: String,
    pub company_name: String,
    pub clickup_task_id: String,
    pub customer_first_name: Option<String>,
    pub phone: Option<String>,
    pub typeform_response_id: Option<String>,
    pub clickup_task_url: Option<String>,
}

impl WebhookPayload {
    /// Validate presence of required fields, collecting *all* missing or
    /// empty ones. This is the pure guard: it must run before any external
    /// call so a rejected payload produces zero side effects.
    pub fn validate(self) -> Result<ValidatedSignup, Vec<String>> {
        fn non_empty(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.trim().is_empty())
        }

        let values = [
            &self.customer_name,
            &self.customer_email,
            &self.company_name,
            &self.clickup_task_id,
        ];
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| !non_empty(value))
            .map(|(name, _)| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ValidatedSignup {
            customer_name: self.customer_name.unwrap_or_default(),
            customer_email: self.customer_email.unwrap_or_default(),
            company_name: self.company_name.unwrap_or_default(),
            clickup_task_id: self.clickup_task_id.unwrap_or_default(),
            customer_first_name: self.customer_first_name,
            phone: self.phone,
            typeform_response_id: self.typeform_response_id,
            clickup_task_url: self.clickup_task_url,
        })
    }
}

impl ValidatedSignup {
    /// ClickUp task URL, derived from the task id when Zapier did not send one.
    pub fn task_url(&self) -> String {
        self.clickup_task_url
            .clone()
            .unwrap_or_else(|| format!("https://app.clickup.com/t/{}", self.clickup_task_id))
    }
}

/// Acknowledgment returned to the workflow orchestrator.
///
/// `email_sent` and `clickup_updated` expose partial success: the company
/// record exists whenever `success` is true, even if a best-effort outbound
/// call failed.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub success: bool,
    pub task_id: String,
    pub task_url: String,
    pub upload_link: String,
    pub customer_token: String,
    pub customer_record_id: Uuid,
    pub email_sent: bool,
    pub clickup_updated: bool,
    pub message: String,
    pub customer_record: CompanyRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> WebhookPayload {
        WebhookPayload {
            customer_name: Some("Test Customer Auto".to_string()),
            customer_email: Some("admin@swipey.co".to_string()),
            company_name: Some("AutoTest Solutions Bhd".to_string()),
            clickup_task_id: Some("task_autotest_001".to_string()),
            phone: Some("+60123456789".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let signup = full_payload().validate().unwrap();
        assert_eq!(signup.customer_name, "Test Customer Auto");
        assert_eq!(signup.clickup_task_id, "task_autotest_001");
        assert_eq!(signup.phone.as_deref(), Some("+60123456789"));
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let payload = WebhookPayload {
            customer_name: Some("Test".to_string()),
            ..Default::default()
        };

        let missing = payload.validate().unwrap_err();
        assert_eq!(
            missing,
            vec!["customer_email", "company_name", "clickup_task_id"]
        );
    }

    #[test]
    fn test_empty_and_whitespace_strings_count_as_missing() {
        let mut payload = full_payload();
        payload.customer_email = Some("".to_string());
        payload.company_name = Some("   ".to_string());

        let missing = payload.validate().unwrap_err();
        assert_eq!(missing, vec!["customer_email", "company_name"]);
    }

    #[test]
    fn test_task_url_derived_when_absent() {
        let signup = full_payload().validate().unwrap();
        assert_eq!(
            signup.task_url(),
            "https://app.clickup.com/t/task_autotest_001"
        );

        let mut payload = full_payload();
        payload.clickup_task_url = Some("https://app.clickup.com/t/custom".to_string());
        assert_eq!(
            payload.validate().unwrap().task_url(),
            "https://app.clickup.com/t/custom"
        );
    }
}
