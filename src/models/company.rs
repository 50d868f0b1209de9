//! Company domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// KYB status progression for a company.
///
/// The only state machine in the system:
/// `pending_documents → documents_uploaded → processing → completed | failed`.
/// Transitions are monotonic; there is no backward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KybStatus {
    PendingDocuments,
    DocumentsUploaded,
    Processing,
    Completed,
    Failed,
}

impl KybStatus {
    /// Status stored on the row at creation time.
    pub const INITIAL: KybStatus = KybStatus::PendingDocuments;

    /// Get status as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingDocuments => "pending_documents",
            Self::DocumentsUploaded => "documents_uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string from the database.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_documents" => Some(Self::PendingDocuments),
            "documents_uploaded" => Some(Self::DocumentsUploaded),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Position in the linear progression; terminal states share the last slot.
    fn rank(&self) -> u8 {
        match self {
            Self::PendingDocuments => 0,
            Self::DocumentsUploaded => 1,
            Self::Processing => 2,
            Self::Completed | Self::Failed => 3,
        }
    }

    /// Whether a transition from `self` to `next` moves forward.
    ///
    /// Terminal states (`completed`, `failed`) accept no further transitions,
    /// which makes re-delivered OCR completions a no-op.
    pub fn can_advance_to(&self, next: KybStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    /// Whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for KybStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Company record as echoed to API callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub email: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub clickup_task_id: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typeform_submission_id: Option<String>,
    pub kyb_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyb_failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_upload_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyb_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::company::Model> for CompanyRecord {
    fn from(m: crate::entity::company::Model) -> Self {
        CompanyRecord {
            id: m.id,
            email: m.email,
            customer_name: m.customer_name,
            customer_first_name: m.customer_first_name,
            phone: m.phone,
            clickup_task_id: m.clickup_task_id,
            company_name: m.company_name,
            typeform_submission_id: m.typeform_submission_id,
            kyb_status: m.kyb_status,
            kyb_failure_reason: m.kyb_failure_reason,
            first_upload_at: m.first_upload_at,
            kyb_completed_at: m.kyb_completed_at,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            KybStatus::PendingDocuments,
            KybStatus::DocumentsUploaded,
            KybStatus::Processing,
            KybStatus::Completed,
            KybStatus::Failed,
        ] {
            assert_eq!(KybStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(KybStatus::parse("unknown"), None);
    }

    #[test]
    fn test_transitions_are_monotonic() {
        use KybStatus::*;

        assert!(PendingDocuments.can_advance_to(DocumentsUploaded));
        assert!(PendingDocuments.can_advance_to(Processing));
        assert!(DocumentsUploaded.can_advance_to(Processing));
        assert!(Processing.can_advance_to(Completed));
        assert!(Processing.can_advance_to(Failed));

        // No backward transitions
        assert!(!DocumentsUploaded.can_advance_to(PendingDocuments));
        assert!(!Processing.can_advance_to(DocumentsUploaded));
        assert!(!Processing.can_advance_to(Processing));
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        use KybStatus::*;

        for next in [PendingDocuments, DocumentsUploaded, Processing, Completed, Failed] {
            assert!(!Completed.can_advance_to(next));
            assert!(!Failed.can_advance_to(next));
        }
    }
}
