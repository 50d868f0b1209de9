//! API endpoint modules.

pub mod companies;
pub mod documents;
pub mod health;
pub mod openapi;
pub mod uploads;
pub mod webhook;

pub use companies::configure_company_routes;
pub use documents::configure_document_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use uploads::configure_upload_routes;
pub use webhook::configure_webhook_routes;
