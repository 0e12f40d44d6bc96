//! Command dispatch and shared wiring

use std::env;
use std::process::ExitCode;

use crate::application::ports::{BackendError, ConfigStore};
use crate::domain::config::AppConfig;
use crate::infrastructure::{HttpBackend, XdgConfigStore};

use super::account_cmd;
use super::args::{Cli, Commands};
use super::config_cmd::{handle_config_command, validate_config};
use super::patients_cmd;
use super::presenter::Presenter;
use super::record_cmd;
use super::report_cmd;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment override for the backend URL
pub const BACKEND_URL_ENV: &str = "CONSULT_BACKEND_URL";

/// Run one parsed command line
pub async fn run(cli: Cli) -> ExitCode {
    let mut presenter = Presenter::new();

    let cli_config = AppConfig {
        backend_url: cli.backend_url,
        documents_dir: cli
            .documents_dir
            .map(|dir| dir.to_string_lossy().to_string()),
        ..Default::default()
    };
    let config = match validate_config(&load_merged_config(cli_config).await) {
        Ok(config) => config,
        // `config` subcommands stay usable so a bad value can be fixed
        Err(_) if matches!(cli.command, Commands::Config { .. }) => AppConfig::defaults(),
        Err(e) => {
            presenter.error(&e.to_string());
            presenter.info(&format!(
                "Fix it with `consult-recorder config set` or edit {}",
                XdgConfigStore::new().path().display()
            ));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            match handle_config_command(action, &store, &presenter).await {
                Ok(()) => ExitCode::from(EXIT_SUCCESS),
                Err(e) => {
                    presenter.error(&e.to_string());
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
        Commands::Record(options) => record_cmd::run_record(options, &config, &mut presenter).await,
        Commands::Login { email, password } => {
            account_cmd::run_login(&email, &password, &config, &mut presenter).await
        }
        Commands::Signup(options) => account_cmd::run_signup(options, &config, &mut presenter).await,
        Commands::ForgotPassword { email } => {
            account_cmd::run_forgot_password(&email, &config, &mut presenter).await
        }
        Commands::Patients { action } => {
            patients_cmd::run_patients(action, &config, &mut presenter).await
        }
        Commands::Report(options) => report_cmd::run_report(options, &config, &mut presenter).await,
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        AppConfig::empty()
    });

    let env_config = AppConfig {
        backend_url: env::var(BACKEND_URL_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// HTTP client for the configured backend
pub fn build_backend(config: &AppConfig) -> Result<HttpBackend, BackendError> {
    HttpBackend::new(
        config.backend_url_or_default(),
        config.request_timeout_or_default(),
    )
}

/// Report a failed command and pick its exit code
pub fn fail(presenter: &mut Presenter, message: &str) -> ExitCode {
    presenter.fail(message);
    ExitCode::from(EXIT_ERROR)
}
