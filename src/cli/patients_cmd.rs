//! `patients` command

use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::PatientDirectory;
use crate::domain::config::AppConfig;
use crate::domain::patient::Patient;
use crate::infrastructure::HttpBackend;

use super::app::{build_backend, fail, EXIT_SUCCESS};
use super::args::PatientsAction;
use super::presenter::Presenter;

pub async fn run_patients(
    action: PatientsAction,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let mut directory = match build_backend(config) {
        Ok(backend) => PatientDirectory::new(backend),
        Err(e) => return fail(presenter, &e.to_string()),
    };

    match action {
        PatientsAction::List { search } => list(&mut directory, search.as_deref(), presenter).await,
        PatientsAction::Show { id } => match directory.details(id).await {
            Ok(patient) => {
                show(presenter, &patient);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => fail(presenter, &e.to_string()),
        },
        PatientsAction::Delete { id, yes } => {
            if !yes && !confirm(presenter, &format!("Delete patient {id}? [y/N]")).await {
                presenter.info("Deletion canceled");
                return ExitCode::from(EXIT_SUCCESS);
            }
            match directory.delete(id).await {
                Ok(message) if message.is_empty() => {
                    presenter.success(&format!("Patient {id} deleted"));
                    ExitCode::from(EXIT_SUCCESS)
                }
                Ok(message) => {
                    presenter.success(&message);
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => fail(presenter, &e.to_string()),
            }
        }
    }
}

async fn list(
    directory: &mut PatientDirectory<HttpBackend>,
    search: Option<&str>,
    presenter: &mut Presenter,
) -> ExitCode {
    presenter.start_spinner("Loading patients...");
    if let Err(e) = directory.refresh().await {
        return fail(presenter, &e.to_string());
    }

    let matches = directory.search(search.unwrap_or_default());
    presenter.spinner_success(&format!("{} patient(s)", matches.len()));
    for patient in matches {
        presenter.patient_row(patient);
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn show(presenter: &Presenter, patient: &Patient) {
    presenter.key_value("id", &patient.id.to_string());
    presenter.key_value("name", &patient.full_name());
    presenter.key_value("birthdate", &patient.birthdate);
    presenter.key_value("weight", patient.weight.as_deref().unwrap_or("-"));
    presenter.key_value("sex", &patient.sex);
    presenter.key_value("medical history", &patient.medical_history);
    presenter.key_value("record date", &patient.record_date);
    if let Some(transcription) = patient.transcription.as_deref() {
        presenter.key_value("transcription", transcription);
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is a no
async fn confirm(presenter: &Presenter, question: &str) -> bool {
    presenter.prompt(question);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    matches!(
        lines.next_line().await,
        Ok(Some(answer)) if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    )
}
