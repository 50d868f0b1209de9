//! SeaORM entities for the onboarding schema.

pub mod company;
pub mod document;
pub mod upload_token;
