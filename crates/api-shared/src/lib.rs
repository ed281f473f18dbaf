//! # API Shared
//!
//! Shared utilities and definitions for the clinic APIs.
//!
//! Contains:
//! - Request/response types (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//! - The session registry that turns login tokens into patient identities
//!
//! Used by `api-rest`.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::SessionRegistry;
pub use health::HealthService;
