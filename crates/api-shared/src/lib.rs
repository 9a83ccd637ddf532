//! # API Shared
//!
//! Shared utilities and definitions for the Carelink APIs.
//!
//! Contains:
//! - Wire DTOs (`dto` module) translating core domain types for the REST
//!   boundary
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the server binaries for common functionality.

pub mod dto;
pub mod health;

pub use health::{HealthRes, HealthService};
