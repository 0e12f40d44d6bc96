//! Practitioner account use cases

use thiserror::Error;
use tracing::info;

use crate::domain::account::{is_valid_email, Credentials, SignupForm};
use crate::domain::error::InputError;

use super::ports::{BackendError, ConsultationBackend};

/// Errors from account operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Login, signup and password reset against the backend.
/// Forms are validated locally before any request is sent.
pub struct AccountService<B: ConsultationBackend> {
    backend: B,
}

impl<B: ConsultationBackend> AccountService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), AccountError> {
        credentials.validate()?;
        self.backend.login(credentials).await?;
        info!(email = %credentials.email, "logged in");
        Ok(())
    }

    /// # Returns
    /// The server's confirmation message
    pub async fn signup(&self, form: &SignupForm) -> Result<String, AccountError> {
        form.validate()?;
        let message = self.backend.signup(form).await?;
        info!(email = %form.email, "account created");
        Ok(message)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), AccountError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(InputError::EmptyField("email").into());
        }
        if !is_valid_email(email) {
            return Err(InputError::InvalidEmail(email.to_string()).into());
        }
        self.backend.forgot_password(email).await?;
        info!(email, "password reset requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::{Patient, PatientId};
    use crate::domain::report::ConsultationReport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockBackend {
        requests: Arc<AtomicUsize>,
        reject: Option<&'static str>,
    }

    impl MockBackend {
        fn answer<T>(&self, value: T) -> Result<T, BackendError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.reject {
                Some(message) => Err(BackendError::Rejected(message.to_string())),
                None => Ok(value),
            }
        }
    }

    #[async_trait]
    impl ConsultationBackend for MockBackend {
        async fn login(&self, _credentials: &Credentials) -> Result<(), BackendError> {
            self.answer(())
        }

        async fn signup(&self, _form: &SignupForm) -> Result<String, BackendError> {
            self.answer("User created".to_string())
        }

        async fn forgot_password(&self, _email: &str) -> Result<(), BackendError> {
            self.answer(())
        }

        async fn list_patients(&self) -> Result<Vec<Patient>, BackendError> {
            unimplemented!()
        }

        async fn patient(&self, _id: PatientId) -> Result<Patient, BackendError> {
            unimplemented!()
        }

        async fn delete_patient(&self, _id: PatientId) -> Result<String, BackendError> {
            unimplemented!()
        }

        async fn generate_pdf(&self, _report: &ConsultationReport) -> Result<String, BackendError> {
            unimplemented!()
        }

        async fn download(&self, _location: &str) -> Result<Vec<u8>, BackendError> {
            unimplemented!()
        }
    }

    fn signup_form() -> SignupForm {
        SignupForm {
            name: "Marie".to_string(),
            surname: "Curie".to_string(),
            email: "marie@clinic.fr".to_string(),
            specialty: "Radiology".to_string(),
            password: "secret".to_string(),
            birthdate: "1967-11-07".to_string(),
        }
    }

    #[tokio::test]
    async fn login_rejects_bad_email_without_request() {
        let backend = MockBackend::default();
        let service = AccountService::new(backend.clone());

        let err = service
            .login(&Credentials::new("not-an-email", "pw"))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::Input(InputError::InvalidEmail(_))));
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn login_surfaces_server_message() {
        let backend = MockBackend {
            reject: Some("Invalid credentials"),
            ..MockBackend::default()
        };
        let service = AccountService::new(backend);

        let err = service
            .login(&Credentials::new("doc@clinic.fr", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn signup_checks_birthdate() {
        let backend = MockBackend::default();
        let service = AccountService::new(backend.clone());
        let form = SignupForm {
            birthdate: "07/11/1967".to_string(),
            ..signup_form()
        };

        let err = service.signup(&form).await.unwrap_err();

        assert!(matches!(err, AccountError::Input(InputError::InvalidBirthdate(_))));
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signup_returns_confirmation() {
        let service = AccountService::new(MockBackend::default());
        assert_eq!(service.signup(&signup_form()).await.unwrap(), "User created");
    }

    #[tokio::test]
    async fn forgot_password_requires_email() {
        let service = AccountService::new(MockBackend::default());

        let err = service.forgot_password("   ").await.unwrap_err();
        assert!(matches!(err, AccountError::Input(InputError::EmptyField("email"))));

        service.forgot_password(" doc@clinic.fr ").await.unwrap();
    }
}
