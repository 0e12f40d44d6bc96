//! CLI presenter for output formatting

use std::io::{self, Write};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::patient::Patient;
use crate::domain::recording::{ElapsedTime, SessionState};

/// Presenter for CLI output formatting.
///
/// Status lines go to stderr; command results go to stdout.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Report a failure, clearing the spinner if one is running.
    /// The error line is printed even when stderr is not a terminal.
    pub fn fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.error(message);
    }

    /// Print a status line without disturbing an active spinner
    fn status(&self, line: String) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    pub fn info(&self, message: &str) {
        self.status(format!("{} {}", "ℹ".cyan(), message));
    }

    pub fn success(&self, message: &str) {
        self.status(format!("{} {}", "✓".green(), message));
    }

    pub fn warn(&self, message: &str) {
        self.status(format!("{} {}", "⚠".yellow(), message));
    }

    pub fn error(&self, message: &str) {
        self.status(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Prompt on stderr without a newline
    pub fn prompt(&self, text: &str) {
        eprint!("{} ", text.bold());
        let _ = io::stderr().flush();
    }

    /// Live status of a recording, e.g. `● REC 0:01:05`
    pub fn format_session(&self, state: SessionState, elapsed: ElapsedTime) -> String {
        let badge = match state {
            SessionState::Recording => "● REC".red().bold(),
            SessionState::Paused => "❚❚ PAUSED".yellow().bold(),
            other => other.as_str().normal(),
        };
        format!("{} {}", badge, elapsed)
    }

    pub fn update_session(&self, state: SessionState, elapsed: ElapsedTime) {
        self.update_spinner(&self.format_session(state, elapsed));
    }

    /// One line of the patient list
    pub fn patient_row(&self, patient: &Patient) {
        println!(
            "{:>5}  {:<30}  {:<10}  {}",
            patient.id.to_string().cyan(),
            patient.full_name(),
            patient.birthdate,
            patient.record_date.dimmed()
        );
    }

    /// Print a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_line_shows_clock() {
        colored::control::set_override(false);
        let presenter = Presenter::new();

        let line = presenter.format_session(SessionState::Recording, ElapsedTime::from_secs(65));
        assert_eq!(line, "● REC 0:01:05");

        let line = presenter.format_session(SessionState::Paused, ElapsedTime::from_secs(3_600));
        assert_eq!(line, "❚❚ PAUSED 1:00:00");
    }
}
