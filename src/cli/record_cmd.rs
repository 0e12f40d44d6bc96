//! Interactive `record` command
//!
//! Reads one command per line from stdin while the recording runs and
//! keeps a live `H:MM:SS` status line on stderr. The stored file's path is
//! printed to stdout on success.

use std::env;
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::ports::{AudioDevice, Clock, RecordingPreset, StorageMover};
use crate::application::{
    PatientDirectory, RecordingResult, RecordingSessionController, SessionConfig, SessionError,
};
use crate::domain::config::AppConfig;
use crate::domain::patient::PatientMetadata;
use crate::infrastructure::{CpalDevice, FsStorage, TokioClock};

use super::app::{build_backend, fail, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use super::args::RecordOptions;
use super::config_cmd::validate_config;
use super::presenter::Presenter;

/// Subdirectory of the documents dir holding recordings
pub const RECORDINGS_DIR: &str = "recordings";

pub const SESSION_HELP: &str =
    "Commands: p = pause/resume, s = stop and save, c = cancel, set <field> <value>, show, help";

const DISPLAY_REFRESH: StdDuration = StdDuration::from_millis(250);

/// One line typed during a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    TogglePause,
    Stop,
    Cancel,
    Set { field: String, value: String },
    Show,
    Help,
    Unknown(String),
}

impl SessionCommand {
    /// `None` for a blank line
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_lowercase().as_str() {
            "p" | "pause" | "resume" => Self::TogglePause,
            "s" | "stop" => Self::Stop,
            "c" | "cancel" => Self::Cancel,
            "show" => Self::Show,
            "h" | "help" | "?" => Self::Help,
            "set" if !rest.is_empty() => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Self::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                }
            }
            _ => Self::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Run the `record` command
pub async fn run_record(
    options: RecordOptions,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let overrides = AppConfig {
        audio_extension: options.extension,
        sample_rate: options.sample_rate,
        ..AppConfig::empty()
    };
    let overrides = match validate_config(&overrides) {
        Ok(overrides) => overrides,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };
    let merged = config.clone().merge(overrides);
    let config = &merged;

    let prefill = match options.patient {
        Some(id) => {
            let backend = match build_backend(config) {
                Ok(backend) => backend,
                Err(e) => return fail(presenter, &e.to_string()),
            };
            match PatientDirectory::new(backend).consultation_metadata(id).await {
                Ok(metadata) => metadata,
                Err(e) => return fail(presenter, &format!("Failed to load patient {id}: {e}")),
            }
        }
        None => PatientMetadata::default(),
    };
    let mut metadata = options.metadata.apply(prefill);

    let preset = RecordingPreset::high_quality().with_sample_rate(config.sample_rate_or_default());
    let session_config = SessionConfig::new(config.documents_dir_or_default().join(RECORDINGS_DIR))
        .with_audio_extension(config.audio_extension_or_default())
        .with_preset(preset);

    let device = CpalDevice::new(env::temp_dir().join("consult-recorder"));
    let mut controller = RecordingSessionController::new(
        device,
        TokioClock::new(),
        FsStorage::new(),
        session_config,
    );

    if let Err(e) = controller.start().await {
        return fail(presenter, &e.to_string());
    }

    presenter.info(SESSION_HELP);
    let line = presenter.format_session(controller.state(), controller.elapsed());
    presenter.start_spinner(&line);

    drive(&mut controller, &mut metadata, presenter).await
}

/// Feed stdin commands to the controller until the session ends
async fn drive<D, C, S>(
    controller: &mut RecordingSessionController<D, C, S>,
    metadata: &mut PatientMetadata,
    presenter: &mut Presenter,
) -> ExitCode
where
    D: AudioDevice,
    C: Clock,
    S: StorageMover,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(DISPLAY_REFRESH);

    loop {
        let line = tokio::select! {
            _ = refresh.tick() => {
                if let Err(e) = controller.check_device().await {
                    return fail(presenter, &e.to_string());
                }
                presenter.update_session(controller.state(), controller.elapsed());
                continue;
            }
            _ = tokio::signal::ctrl_c() => {
                controller.cancel().await;
                presenter.spinner_fail("Recording canceled");
                return ExitCode::from(EXIT_ERROR);
            }
            line = lines.next_line() => line,
        };

        // End of input saves the recording if the form is complete
        let (command, at_eof) = match line {
            Ok(Some(line)) => match SessionCommand::parse(&line) {
                Some(command) => (command, false),
                None => continue,
            },
            Ok(None) => (SessionCommand::Stop, true),
            Err(e) => {
                controller.cancel().await;
                return fail(presenter, &format!("Failed to read input: {e}"));
            }
        };

        match command {
            SessionCommand::TogglePause => match controller.toggle_pause().await {
                Ok(state) => presenter.update_session(state, controller.elapsed()),
                Err(e) => return fail(presenter, &e.to_string()),
            },
            SessionCommand::Stop => match controller.stop(metadata).await {
                Ok(Some(result)) => {
                    report_saved(presenter, &result);
                    return ExitCode::from(EXIT_SUCCESS);
                }
                Ok(None) => {}
                Err(SessionError::Validation(missing)) => {
                    if at_eof {
                        controller.cancel().await;
                        return fail(presenter, &format!("{missing}; recording discarded"));
                    }
                    presenter.warn(&missing.to_string());
                    presenter.info("Fill them in with: set <field> <value>");
                }
                Err(e) => return fail(presenter, &e.to_string()),
            },
            SessionCommand::Cancel => {
                controller.cancel().await;
                presenter.spinner_fail("Recording discarded");
                return ExitCode::from(EXIT_SUCCESS);
            }
            SessionCommand::Set { field, value } => match metadata.set_field(&field, value) {
                Ok(()) => presenter.success(&format!("{field} updated")),
                Err(e) => presenter.warn(&e.to_string()),
            },
            SessionCommand::Show => show_metadata(presenter, metadata),
            SessionCommand::Help => presenter.info(SESSION_HELP),
            SessionCommand::Unknown(input) => {
                presenter.warn(&format!("Unknown command: {input}"));
            }
        }
    }
}

fn report_saved(presenter: &mut Presenter, result: &RecordingResult) {
    presenter.spinner_success(&format!(
        "Recording saved ({}, {} bytes)",
        result.elapsed, result.size_bytes
    ));
    presenter.info(&format!(
        "Patient: {} {}, born {}",
        result.metadata.name,
        result.metadata.surname,
        result.metadata.birthdate_display()
    ));
    presenter.output(&result.uri.display().to_string());
}

fn show_metadata(presenter: &Presenter, metadata: &PatientMetadata) {
    let fields = [
        ("name", &metadata.name),
        ("surname", &metadata.surname),
        ("day", &metadata.day),
        ("month", &metadata.month),
        ("year", &metadata.year),
        ("weight", &metadata.weight),
        ("sex", &metadata.sex),
        ("history", &metadata.medical_history),
    ];
    for (field, value) in fields {
        let shown = if value.trim().is_empty() { "-" } else { value.as_str() };
        presenter.info(&format!("{field}: {shown}"));
    }

    let missing = metadata.missing_fields();
    if !missing.is_empty() {
        presenter.warn(&format!("Still required: {}", missing.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letter_commands() {
        assert_eq!(SessionCommand::parse("p"), Some(SessionCommand::TogglePause));
        assert_eq!(SessionCommand::parse(" S "), Some(SessionCommand::Stop));
        assert_eq!(SessionCommand::parse("c"), Some(SessionCommand::Cancel));
        assert_eq!(SessionCommand::parse("?"), Some(SessionCommand::Help));
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(SessionCommand::parse("   "), None);
    }

    #[test]
    fn set_keeps_spaces_in_value() {
        assert_eq!(
            SessionCommand::parse("set history  Type 2 diabetes, insulin "),
            Some(SessionCommand::Set {
                field: "history".to_string(),
                value: "Type 2 diabetes, insulin".to_string(),
            })
        );
    }

    #[test]
    fn set_without_value_clears_field() {
        assert_eq!(
            SessionCommand::parse("set weight"),
            Some(SessionCommand::Set {
                field: "weight".to_string(),
                value: String::new(),
            })
        );
    }

    #[test]
    fn bare_set_is_unknown() {
        assert_eq!(
            SessionCommand::parse("set"),
            Some(SessionCommand::Unknown("set".to_string()))
        );
    }
}
