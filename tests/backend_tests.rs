//! HTTP backend integration tests against a local mock server

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consult_recorder::application::ports::{BackendError, ConsultationBackend};
use consult_recorder::application::{AccountError, AccountService, PatientDirectory, ReportService};
use consult_recorder::domain::{ConsultationReport, Credentials, PatientMetadata};
use consult_recorder::infrastructure::{FsStorage, HttpBackend};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn patients_body() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "name": "Martin",
            "surname": "Louis",
            "birthdate": "1961-03-12",
            "weight": 82,
            "sex": "Male",
            "medicalHistory": "Hypertension",
            "recordDate": "2024-05-02"
        },
        {
            "id": 2,
            "name": "Durand",
            "surname": "Alice",
            "birthdate": "1985-07-04",
            "weight": "61.5",
            "sex": "Female",
            "medicalHistory": "Asthma",
            "recordDate": "2024-06-10",
            "transcription": "Follow-up visit."
        }
    ])
}

#[tokio::test]
async fn login_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "email": "doc@clinic.fr", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let service = AccountService::new(backend(&server));
    service
        .login(&Credentials::new("doc@clinic.fr", "secret"))
        .await
        .unwrap();
}

#[tokio::test]
async fn login_surfaces_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .login(&Credentials::new("doc@clinic.fr", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(&err, BackendError::Rejected(m) if m == "Invalid credentials"));
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn invalid_email_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = AccountService::new(backend(&server));
    let err = service.forgot_password("not-an-email").await.unwrap_err();
    assert!(matches!(err, AccountError::Input(_)));
}

#[tokio::test]
async fn patients_accept_numeric_and_text_weight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patients_body()))
        .mount(&server)
        .await;

    let patients = backend(&server).list_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0].weight.as_deref(), Some("82"));
    assert_eq!(patients[1].weight.as_deref(), Some("61.5"));
    assert_eq!(patients[1].medical_history, "Asthma");
    assert_eq!(patients[1].transcription.as_deref(), Some("Follow-up visit."));
}

#[tokio::test]
async fn directory_search_filters_loaded_patients() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patients_body()))
        .mount(&server)
        .await;

    let mut directory = PatientDirectory::new(backend(&server));
    directory.refresh().await.unwrap();

    let found = directory.search("  alice ");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 2);
    assert_eq!(directory.search("").len(), 2);
}

#[tokio::test]
async fn missing_patient_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patient/42"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend(&server).patient(42).await.unwrap_err();
    assert!(matches!(err, BackendError::NotFound(_)));
}

#[tokio::test]
async fn consultation_metadata_prefills_from_patient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patient/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patients_body()[0].clone()))
        .mount(&server)
        .await;

    let metadata = PatientDirectory::new(backend(&server))
        .consultation_metadata(1)
        .await
        .unwrap();
    assert_eq!(metadata.day, "12");
    assert_eq!(metadata.month, "03");
    assert_eq!(metadata.year, "1961");
    assert_eq!(metadata.weight, "82");
    assert!(metadata.is_complete());
}

#[tokio::test]
async fn delete_returns_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/patients/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Patient deleted" })),
        )
        .mount(&server)
        .await;

    let message = backend(&server).delete_patient(2).await.unwrap();
    assert_eq!(message, "Patient deleted");
}

#[tokio::test]
async fn server_error_without_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server).list_patients().await.unwrap_err();
    assert!(matches!(err, BackendError::Status(500)));
}

fn report() -> ConsultationReport {
    ConsultationReport::new(
        PatientMetadata {
            name: "Durand".to_string(),
            surname: "Alice".to_string(),
            day: "04".to_string(),
            month: "07".to_string(),
            year: "1985".to_string(),
            weight: "61.5".to_string(),
            sex: "Female".to_string(),
            medical_history: "Asthma".to_string(),
        },
        "Patient reports mild wheezing.",
    )
}

#[tokio::test]
async fn report_is_generated_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-pdf"))
        .and(body_json(json!({
            "name": "Durand",
            "surname": "Alice",
            "day": "04",
            "month": "07",
            "year": "1985",
            "weight": "61.5",
            "sex": "Female",
            "medicalHistory": "Asthma",
            "transcription": "Patient reports mild wheezing."
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "pdf_url": "/static/pdfs/Durand_Alice_Result.pdf" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/static/pdfs/Durand_Alice_Result.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 test".to_vec()))
        .mount(&server)
        .await;

    let documents = TempDir::new().unwrap();
    let service = ReportService::new(backend(&server), FsStorage::new(), documents.path());

    let saved = service.download(&report()).await.unwrap();
    assert_eq!(saved, documents.path().join("Durand_Alice_Result.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.4 test");
}

#[tokio::test]
async fn report_without_pdf_url_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .mount(&server)
        .await;

    let err = backend(&server).generate_pdf(&report()).await.unwrap_err();
    assert!(matches!(err, BackendError::ParseError(_)));
}
