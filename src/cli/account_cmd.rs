//! `login`, `signup` and `forgot-password` commands

use std::process::ExitCode;

use crate::application::AccountService;
use crate::domain::account::{Credentials, SignupForm};
use crate::domain::config::AppConfig;
use crate::infrastructure::HttpBackend;

use super::app::{build_backend, fail, EXIT_SUCCESS};
use super::args::SignupOptions;
use super::presenter::Presenter;

fn service(
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<AccountService<HttpBackend>, ExitCode> {
    build_backend(config)
        .map(AccountService::new)
        .map_err(|e| fail(presenter, &e.to_string()))
}

pub async fn run_login(
    email: &str,
    password: &str,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let service = match service(config, presenter) {
        Ok(service) => service,
        Err(code) => return code,
    };

    presenter.start_spinner("Logging in...");
    match service.login(&Credentials::new(email, password)).await {
        Ok(()) => {
            presenter.spinner_success(&format!("Logged in as {email}"));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(presenter, &e.to_string()),
    }
}

pub async fn run_signup(
    options: SignupOptions,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let service = match service(config, presenter) {
        Ok(service) => service,
        Err(code) => return code,
    };

    let form = SignupForm {
        name: options.name,
        surname: options.surname,
        email: options.email,
        specialty: options.specialty,
        password: options.password,
        birthdate: options.birthdate,
    };

    presenter.start_spinner("Creating account...");
    match service.signup(&form).await {
        Ok(message) if message.is_empty() => {
            presenter.spinner_success("Account created");
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(message) => {
            presenter.spinner_success(&message);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(presenter, &e.to_string()),
    }
}

pub async fn run_forgot_password(
    email: &str,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> ExitCode {
    let service = match service(config, presenter) {
        Ok(service) => service,
        Err(code) => return code,
    };

    presenter.start_spinner("Requesting password reset...");
    match service.forgot_password(email).await {
        Ok(()) => {
            presenter.spinner_success("An email with your new password has been sent");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(presenter, &e.to_string()),
    }
}
