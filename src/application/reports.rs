//! Consultation report use case

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::domain::report::ConsultationReport;

use super::ports::{BackendError, ConsultationBackend, StorageError, StorageMover};

/// Errors from report generation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to generate PDF: {0}")]
    Backend(#[from] BackendError),

    #[error("Failed to save PDF: {0}")]
    Storage(#[from] StorageError),
}

/// Renders a consultation summary on the server and saves the PDF locally
pub struct ReportService<B, S>
where
    B: ConsultationBackend,
    S: StorageMover,
{
    backend: B,
    storage: S,
    documents_dir: PathBuf,
}

impl<B, S> ReportService<B, S>
where
    B: ConsultationBackend,
    S: StorageMover,
{
    pub fn new(backend: B, storage: S, documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            storage,
            documents_dir: documents_dir.into(),
        }
    }

    /// Generate, download and save the PDF.
    ///
    /// # Returns
    /// Path of the saved file, `<documents>/<name>_<surname>_Result.pdf`
    pub async fn download(&self, report: &ConsultationReport) -> Result<PathBuf, ReportError> {
        let location = self.backend.generate_pdf(report).await?;
        let bytes = self.backend.download(&location).await?;

        let path = self.documents_dir.join(report.pdf_file_name());
        self.storage.write(&path, &bytes).await?;
        info!(path = %path.display(), size = bytes.len(), "report saved");
        Ok(path)
    }
}
