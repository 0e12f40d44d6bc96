//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting and one runner per
//! subcommand.

pub mod account_cmd;
pub mod app;
pub mod args;
pub mod config_cmd;
pub mod patients_cmd;
pub mod presenter;
pub mod record_cmd;
pub mod report_cmd;

// Re-export commonly used types
pub use app::{run, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, PatientsAction};
pub use presenter::Presenter;
