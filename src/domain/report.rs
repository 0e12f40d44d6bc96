//! Consultation summary sent to the backend for PDF rendering

use serde::Serialize;

use crate::domain::patient::PatientMetadata;

/// Metadata plus the consultation transcription.
/// Serializes flat, as the `/generate-pdf` endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationReport {
    #[serde(flatten)]
    pub metadata: PatientMetadata,
    pub transcription: String,
}

impl ConsultationReport {
    pub fn new(metadata: PatientMetadata, transcription: impl Into<String>) -> Self {
        Self {
            metadata,
            transcription: transcription.into(),
        }
    }

    /// `<name>_<surname>_Result.pdf`, with path separators replaced
    pub fn pdf_file_name(&self) -> String {
        let name = format!(
            "{}_{}_Result.pdf",
            self.metadata.name.trim(),
            self.metadata.surname.trim()
        );
        name.replace(['/', '\\'], "_")
    }
}
