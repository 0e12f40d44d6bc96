//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod accounts;
pub mod patients;
pub mod ports;
pub mod recording;
pub mod reports;

// Re-export use cases
pub use accounts::{AccountError, AccountService};
pub use patients::PatientDirectory;
pub use recording::{
    RecordingResult, RecordingSession, RecordingSessionController, SessionConfig, SessionError,
    TICK_INTERVAL,
};
pub use reports::{ReportError, ReportService};
