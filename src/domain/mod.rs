//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod account;
pub mod config;
pub mod error;
pub mod patient;
pub mod recording;
pub mod report;

// Re-export common types
pub use account::{Credentials, SignupForm};
pub use config::AppConfig;
pub use error::*;
pub use patient::{Patient, PatientId, PatientMetadata};
pub use recording::{ElapsedTime, SessionState};
pub use report::ConsultationReport;
