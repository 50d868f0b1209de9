//! Domain models and DTOs.

pub mod company;
pub mod document;
pub mod webhook;

pub use company::{CompanyRecord, KybStatus};
pub use document::{Director, DocumentRecord, ExtractedFields, OcrStatus};
pub use webhook::{ValidatedSignup, WebhookPayload, WebhookResponse};
