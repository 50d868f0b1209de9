//! Document domain models and OCR extraction payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// OCR processing status for a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OcrStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl OcrStatus {
    /// Get status as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string from the database.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the status is terminal. Terminal documents are never
    /// reprocessed automatically; re-delivered results are dropped.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One company director extracted from an SSM document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Director {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

/// Structured fields extracted from a registration document (stored as JSONB).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorporation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directors: Vec<Director>,
}

impl ExtractedFields {
    /// Serialize for JSONB storage.
    pub fn to_json(&self) -> Option<JsonValue> {
        serde_json::to_value(self).ok()
    }

    /// True when nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        *self == ExtractedFields::default()
    }
}

/// Document record as returned to API callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub ocr_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_fields: Option<JsonValue>,
}

impl From<crate::entity::document::Model> for DocumentRecord {
    fn from(m: crate::entity::document::Model) -> Self {
        DocumentRecord {
            id: m.id,
            filename: m.filename,
            file_size: m.file_size,
            uploaded_at: m.uploaded_at,
            ocr_status: m.ocr_status,
            ocr_completed_at: m.ocr_completed_at,
            ocr_failure_reason: m.ocr_failure_reason,
            extracted_fields: m.extracted_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_status_round_trip() {
        for status in [
            OcrStatus::Pending,
            OcrStatus::Processing,
            OcrStatus::Completed,
            OcrStatus::Failed,
        ] {
            assert_eq!(OcrStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OcrStatus::Completed.is_terminal());
        assert!(OcrStatus::Failed.is_terminal());
        assert!(!OcrStatus::Pending.is_terminal());
        assert!(!OcrStatus::Processing.is_terminal());
    }

    #[test]
    fn test_extracted_fields_json_omits_absent_values() {
        let fields = ExtractedFields {
            company_name: Some("AutoTest Solutions Bhd".to_string()),
            registration_number: Some("202301012345".to_string()),
            ..Default::default()
        };

        let json = fields.to_json().unwrap();
        assert_eq!(json["company_name"], "AutoTest Solutions Bhd");
        assert!(json.get("business_address").is_none());
        assert!(json.get("directors").is_none());
    }

    #[test]
    fn test_extracted_fields_empty_detection() {
        assert!(ExtractedFields::default().is_empty());
        let fields = ExtractedFields {
            company_type: Some("Sdn Bhd".to_string()),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }
}
