//! Consultation backend port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::{Credentials, SignupForm};
use crate::domain::patient::{Patient, PatientId};
use crate::domain::report::ConsultationReport;

/// Backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The server answered with an `{"error": ...}` message
    #[error("{0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error: HTTP {0}")]
    Status(u16),

    #[error("Failed to parse server response: {0}")]
    ParseError(String),
}

/// Port for the REST service holding accounts, patients and reports
#[async_trait]
pub trait ConsultationBackend: Send + Sync {
    /// Check practitioner credentials.
    ///
    /// # Arguments
    /// * `credentials` - Email and password as typed
    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError>;

    /// Create a practitioner account.
    ///
    /// # Returns
    /// The server's confirmation message
    async fn signup(&self, form: &SignupForm) -> Result<String, BackendError>;

    /// Ask the server to email a new password.
    async fn forgot_password(&self, email: &str) -> Result<(), BackendError>;

    /// Fetch every patient on record.
    async fn list_patients(&self) -> Result<Vec<Patient>, BackendError>;

    /// Fetch one patient.
    ///
    /// # Returns
    /// The patient, or `NotFound` if the id is unknown
    async fn patient(&self, id: PatientId) -> Result<Patient, BackendError>;

    /// Delete a patient and their records.
    ///
    /// # Returns
    /// The server's confirmation message
    async fn delete_patient(&self, id: PatientId) -> Result<String, BackendError>;

    /// Render a consultation summary.
    ///
    /// # Returns
    /// Server-relative location of the generated PDF
    async fn generate_pdf(&self, report: &ConsultationReport) -> Result<String, BackendError>;

    /// Fetch raw bytes.
    ///
    /// # Arguments
    /// * `location` - Server-relative path or absolute URL
    async fn download(&self, location: &str) -> Result<Vec<u8>, BackendError>;
}
