//! `report` command

use std::process::ExitCode;

use crate::application::ports::ConsultationBackend;
use crate::application::ReportService;
use crate::domain::config::AppConfig;
use crate::domain::patient::PatientMetadata;
use crate::domain::report::ConsultationReport;
use crate::infrastructure::FsStorage;

use super::app::{build_backend, fail, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::args::ReportOptions;
use super::presenter::Presenter;

pub async fn run_report(
    options: ReportOptions,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let backend = match build_backend(config) {
        Ok(backend) => backend,
        Err(e) => return fail(presenter, &e.to_string()),
    };

    let (prefill, stored_transcription) = match options.patient {
        Some(id) => match backend.patient(id).await {
            Ok(patient) => (PatientMetadata::from_patient(&patient), patient.transcription),
            Err(e) => return fail(presenter, &format!("Failed to load patient {id}: {e}")),
        },
        None => (PatientMetadata::default(), None),
    };
    let metadata = options.metadata.apply(prefill);

    let transcription = match (options.transcription, options.transcription_file) {
        (Some(text), _) => text,
        (None, Some(path)) => match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                return fail(
                    presenter,
                    &format!("Failed to read {}: {e}", path.display()),
                )
            }
        },
        (None, None) => stored_transcription.unwrap_or_default(),
    };

    if metadata.name.trim().is_empty() || metadata.surname.trim().is_empty() {
        presenter.error("A patient name and surname are required (use --patient or --name/--surname)");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let report = ConsultationReport::new(metadata, transcription);
    let service = ReportService::new(backend, FsStorage::new(), config.documents_dir_or_default());

    presenter.start_spinner("Generating PDF...");
    match service.download(&report).await {
        Ok(path) => {
            presenter.spinner_success("PDF downloaded");
            presenter.output(&path.display().to_string());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(presenter, &e.to_string()),
    }
}
