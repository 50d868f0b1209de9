//! KYB onboarding server library.
//!
//! Core functionality for the webhook-driven customer onboarding backend:
//! upload-token issuance, document intake, storage, and OCR extraction.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
