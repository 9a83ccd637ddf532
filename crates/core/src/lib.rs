//! # Carelink Core
//!
//! Core business logic for the Carelink clinician portal.
//!
//! This crate contains pure data operations over an in-memory domain store:
//! - The domain model (patients, care plans, messaging, analytics reports)
//! - [`PortalStore`], the explicit repository owning every collection
//! - Aggregation functions for dashboard and analytics statistics
//! - Filter/sort functions computing the visible subset of each list
//! - The session state machine and its persisted marker
//! - The seeded demo dataset
//!
//! **No API concerns**: HTTP servers, routing and wire DTOs belong in
//! `api-rest` and `api-shared`.

pub mod aggregate;
pub mod care_plan;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod messaging;
pub mod patient;
pub mod query;
pub mod reports;
pub mod seed;
pub mod session;
pub mod store;

pub use config::CoreConfig;
pub use error::{PortalError, PortalResult};
pub use ids::{
    CarePlanId, ConversationId, MealPlanId, MessageId, ParticipantId, PatientId, UserId,
};
pub use portal_types::{AdherenceRate, NonEmptyText};
pub use store::PortalStore;
