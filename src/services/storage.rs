//! S3 storage service for uploaded KYB documents.
//!
//! Supports both AWS S3 and MinIO for development.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::types::ServerSideEncryption;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "kyb");

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        // Use custom endpoint for MinIO in development
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let s3_config = s3_config_builder.build();
        let client = Client::from_conf(s3_config);

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
        };

        // Verify bucket exists or create it
        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Upload a document to S3 with server-side encryption.
    pub async fn put_document(&self, key: &str, data: Vec<u8>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type("application/pdf")
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload document to S3: {}", e)))?;

        Ok(())
    }

    /// Get a stored document from S3.
    pub async fn get_document(&self, key: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::NotFound(format!("Document object {}", key))
                } else {
                    AppError::Storage(format!("Failed to get document from S3: {}", service_error))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read S3 response body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    /// The bucket documents are stored in (needed by the Textract dispatcher).
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Build the S3 key for a customer document.
    ///
    /// Format: documents/customer-{company_id}/SSM_{n}_{document_id}.pdf.
    /// The document id makes the key unique on its own; two concurrent
    /// uploads that compute the same ordinal still store distinct objects.
    pub fn document_key(company_id: Uuid, document_id: Uuid, ordinal: u64) -> String {
        format!(
            "documents/customer-{}/SSM_{}_{}.pdf",
            company_id, ordinal, document_id
        )
    }

    /// Server-assigned filename for a customer's nth document.
    pub fn document_filename(ordinal: u64) -> String {
        format!("SSM_{}.pdf", ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_format() {
        let company = Uuid::parse_str("0a4f6f2e-1111-2222-3333-444455556666").unwrap();
        let doc = Uuid::parse_str("7777aaaa-8888-9999-aaaa-bbbbccccdddd").unwrap();
        assert_eq!(
            Storage::document_key(company, doc, 1),
            "documents/customer-0a4f6f2e-1111-2222-3333-444455556666/SSM_1_7777aaaa-8888-9999-aaaa-bbbbccccdddd.pdf"
        );
    }

    #[test]
    fn test_document_keys_distinct_for_same_ordinal() {
        let company = Uuid::new_v4();
        let key_a = Storage::document_key(company, Uuid::new_v4(), 1);
        let key_b = Storage::document_key(company, Uuid::new_v4(), 1);
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn test_document_filename_ordinal() {
        assert_eq!(Storage::document_filename(1), "SSM_1.pdf");
        assert_eq!(Storage::document_filename(3), "SSM_3.pdf");
    }
}
