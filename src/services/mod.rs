//! Service layer: token generation, storage, outbound clients, workflows.

pub mod clickup;
pub mod email;
pub mod ocr;
pub mod onboarding;
pub mod storage;
pub mod textract;
pub mod token;

pub use clickup::ClickUpClient;
pub use email::EmailClient;
pub use ocr::OcrDispatcher;
pub use onboarding::OnboardingService;
pub use storage::Storage;
pub use textract::TextractClient;
