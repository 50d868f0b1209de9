//! SendGrid notification sender.
//!
//! Sends the upload-link email through SendGrid's v3 mail/send API using a
//! dynamic template. Like ClickUp, failures after a successful record insert
//! are logged and reported as partial success, never rolled back.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::EmailSettings;
use crate::error::{AppError, AppResult};

/// SendGrid v3 mail send endpoint.
const DEFAULT_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// HTTP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP total timeout per request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// SendGrid client. Disabled (no-op) in development when no key is set;
/// production config validation guarantees a key is present there.
#[derive(Clone)]
pub struct EmailClient {
    api_key: Option<SecretString>,
    from_email: String,
    from_name: String,
    template_id: String,
    send_url: String,
    http_client: reqwest::Client,
}

impl EmailClient {
    /// Create a client from settings.
    pub fn new(settings: &EmailSettings) -> Self {
        if settings.api_key.is_none() {
            warn!("SENDGRID_API_KEY not configured; upload-link emails will be skipped");
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client for SendGrid");

        Self {
            api_key: settings.api_key.clone(),
            from_email: settings.from_email.clone(),
            from_name: settings.from_name.clone(),
            template_id: settings.upload_template_id.clone(),
            send_url: DEFAULT_SEND_URL.to_string(),
            http_client,
        }
    }

    #[cfg(test)]
    fn with_send_url(mut self, url: &str) -> Self {
        self.send_url = url.to_string();
        self
    }

    /// Send the templated upload-link email to one recipient.
    ///
    /// Returns Ok(false) when the client is disabled.
    pub async fn send_upload_link(
        &self,
        to_email: &str,
        customer_name: &str,
        upload_link: &str,
        company_name: &str,
    ) -> AppResult<bool> {
        let Some(ref key) = self.api_key else {
            return Ok(false);
        };

        let body = upload_email_body(
            &self.from_email,
            &self.from_name,
            &self.template_id,
            to_email,
            customer_name,
            upload_link,
            company_name,
        );

        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService {
                service: "sendgrid",
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("SendGrid rejected upload-link email to {}: {} {}", to_email, status, text);
            return Err(AppError::ExternalService {
                service: "sendgrid",
                message: format!("{}: {}", status, text),
            });
        }

        info!("Upload-link email queued for {}", to_email);
        Ok(true)
    }
}

/// Build the mail/send request body for the dynamic template.
///
/// `Company_name` is capitalized to match the template's placeholder.
fn upload_email_body(
    from_email: &str,
    from_name: &str,
    template_id: &str,
    to_email: &str,
    customer_name: &str,
    upload_link: &str,
    company_name: &str,
) -> serde_json::Value {
    serde_json::json!({
        "from": { "email": from_email, "name": from_name },
        "template_id": template_id,
        "personalizations": [{
            "to": [{ "email": to_email, "name": customer_name }],
            "dynamic_template_data": {
                "customer_name": customer_name,
                "upload_link": upload_link,
                "Company_name": company_name,
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_body_shape() {
        let body = upload_email_body(
            "kyb@example.com",
            "Onboarding",
            "d-123",
            "admin@swipey.co",
            "Test Customer Auto",
            "https://x.test/upload/tok",
            "AutoTest Solutions Bhd",
        );

        assert_eq!(body["template_id"], "d-123");
        assert_eq!(body["from"]["email"], "kyb@example.com");
        let p = &body["personalizations"][0];
        assert_eq!(p["to"][0]["email"], "admin@swipey.co");
        assert_eq!(p["dynamic_template_data"]["upload_link"], "https://x.test/upload/tok");
        assert_eq!(
            p["dynamic_template_data"]["Company_name"],
            "AutoTest Solutions Bhd"
        );
    }

    #[test]
    fn test_disabled_client_is_a_noop() {
        let settings = EmailSettings {
            api_key: None,
            from_email: "kyb@example.com".to_string(),
            from_name: "Onboarding".to_string(),
            upload_template_id: "d-123".to_string(),
        };
        let client = EmailClient::new(&settings).with_send_url("http://localhost:1");

        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(client.send_upload_link("a@b.c", "A", "link", "Co"));
        assert!(matches!(result, Ok(false)));
    }
}
