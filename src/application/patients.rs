//! Patient directory use case

use tracing::{debug, info};

use crate::domain::patient::{filter_patients, Patient, PatientId, PatientMetadata};

use super::ports::{BackendError, ConsultationBackend};

/// Cached patient list with search, backed by the consultation server
pub struct PatientDirectory<B: ConsultationBackend> {
    backend: B,
    patients: Vec<Patient>,
}

impl<B: ConsultationBackend> PatientDirectory<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            patients: Vec::new(),
        }
    }

    /// Fetch the full list from the server, replacing the cache
    pub async fn refresh(&mut self) -> Result<&[Patient], BackendError> {
        self.patients = self.backend.list_patients().await?;
        debug!(count = self.patients.len(), "patient list refreshed");
        Ok(&self.patients)
    }

    /// Patients from the last refresh
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Filter the cached list; an empty term returns everyone
    pub fn search(&self, term: &str) -> Vec<&Patient> {
        filter_patients(&self.patients, term.trim())
    }

    pub async fn details(&self, id: PatientId) -> Result<Patient, BackendError> {
        self.backend.patient(id).await
    }

    /// Delete a patient, then reload the list.
    ///
    /// # Returns
    /// The server's confirmation message
    pub async fn delete(&mut self, id: PatientId) -> Result<String, BackendError> {
        let message = self.backend.delete_patient(id).await?;
        info!(id, "patient deleted");
        self.refresh().await?;
        Ok(message)
    }

    /// Metadata for a new consultation, prefilled from a patient record
    pub async fn consultation_metadata(
        &self,
        id: PatientId,
    ) -> Result<PatientMetadata, BackendError> {
        let patient = self.details(id).await?;
        Ok(PatientMetadata::from_patient(&patient))
    }
}
