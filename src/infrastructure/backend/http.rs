//! REST client for the consultation backend

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{BackendError, ConsultationBackend};
use crate::domain::account::{Credentials, SignupForm};
use crate::domain::patient::{Patient, PatientId};
use crate::domain::report::ConsultationReport;

/// `{"message": ...}` or `{"error": ...}` reply body
#[derive(Debug, Default, Deserialize)]
struct MessageReply {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct PdfReply {
    pdf_url: Option<String>,
}

/// Consultation backend over HTTP/JSON
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URLs pass through; anything else is relative to the base
    fn resolve(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else if location.starts_with('/') {
            self.url(location)
        } else {
            format!("{}/{}", self.base_url, location)
        }
    }

    /// Pass successful responses through; turn failures into errors,
    /// preferring the server's own `error` message.
    async fn check(response: Response, what: &str) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(MessageReply {
            error: Some(message),
            ..
        }) = serde_json::from_str(&body)
        {
            return Err(BackendError::Rejected(message));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }
        Err(BackendError::Status(status.as_u16()))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        debug!(status = response.status().as_u16(), what, "backend replied");
        Self::check(response, what).await
    }

    /// Read a message reply; an `error` field in a 2xx body still fails
    async fn message(response: Response) -> Result<String, BackendError> {
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(String::new());
        }
        let reply: MessageReply =
            serde_json::from_str(&body).map_err(|e| BackendError::ParseError(e.to_string()))?;
        match reply {
            MessageReply {
                error: Some(error), ..
            } => Err(BackendError::Rejected(error)),
            MessageReply { message, .. } => Ok(message.unwrap_or_default()),
        }
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, BackendError> {
        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl ConsultationBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError> {
        let request = self.client.post(self.url("/login")).json(credentials);
        let response = self.send(request, "login").await?;
        Self::message(response).await.map(|_| ())
    }

    async fn signup(&self, form: &SignupForm) -> Result<String, BackendError> {
        let request = self.client.post(self.url("/signup")).json(form);
        let response = self.send(request, "signup").await?;
        Self::message(response).await
    }

    async fn forgot_password(&self, email: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.url("/forgot-password"))
            .json(&ForgotPasswordRequest { email });
        let response = self.send(request, "account").await?;
        Self::message(response).await.map(|_| ())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, BackendError> {
        let request = self.client.get(self.url("/patients"));
        let response = self.send(request, "patients").await?;
        Self::json(response).await
    }

    async fn patient(&self, id: PatientId) -> Result<Patient, BackendError> {
        let request = self.client.get(self.url(&format!("/patient/{id}")));
        let response = self.send(request, &format!("patient {id}")).await?;
        Self::json(response).await
    }

    async fn delete_patient(&self, id: PatientId) -> Result<String, BackendError> {
        let request = self.client.delete(self.url(&format!("/patients/{id}")));
        let response = self.send(request, &format!("patient {id}")).await?;
        Self::message(response).await
    }

    async fn generate_pdf(&self, report: &ConsultationReport) -> Result<String, BackendError> {
        let request = self.client.post(self.url("/generate-pdf")).json(report);
        let response = self.send(request, "report").await?;
        let reply: PdfReply = Self::json(response).await?;
        reply
            .pdf_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| BackendError::ParseError("reply has no pdf_url".to_string()))
    }

    async fn download(&self, location: &str) -> Result<Vec<u8>, BackendError> {
        let request = self.client.get(self.resolve(location));
        let response = self.send(request, location).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, StdDuration::from_secs(5)).unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(backend("http://host:5000/").base_url(), "http://host:5000");
    }

    #[test]
    fn resolve_relative_and_absolute_locations() {
        let backend = backend("http://host:5000");

        assert_eq!(backend.resolve("/static/a.pdf"), "http://host:5000/static/a.pdf");
        assert_eq!(backend.resolve("static/a.pdf"), "http://host:5000/static/a.pdf");
        assert_eq!(
            backend.resolve("https://cdn.example.com/a.pdf"),
            "https://cdn.example.com/a.pdf"
        );
    }

    #[test]
    fn forgot_password_body() {
        let json = serde_json::to_value(ForgotPasswordRequest { email: "a@b.c" }).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "a@b.c" }));
    }
}
