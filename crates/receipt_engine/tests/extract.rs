use std::time::Duration;

use receipt_engine::{
    ExtractFailureKind, ExtractSettings, ExtractionRequest, Extractor, GeminiExtractor,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ExtractionRequest {
    ExtractionRequest {
        file_name: "scan.pdf".to_string(),
        media_type: "application/pdf".to_string(),
        bytes: vec![0x25, 0x50, 0x44, 0x46].into(),
    }
}

fn settings(server: &MockServer) -> ExtractSettings {
    ExtractSettings {
        api_key: Some("test-key".to_string()),
        api_base: server.uri(),
        request_timeout: Duration::from_secs(5),
        ..ExtractSettings::default()
    }
}

fn model_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    }))
}

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    let extractor = GeminiExtractor::new(ExtractSettings {
        api_key: None,
        // Unroutable base; reaching the network here would fail the test
        // with a different error kind.
        api_base: "http://127.0.0.1:1".to_string(),
        ..ExtractSettings::default()
    });

    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::MissingCredential);
    assert_eq!(err.message, "API key is required");
}

#[tokio::test]
async fn successful_extraction_decodes_schema_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(body_string_contains("Extract receipt information"))
        .respond_with(model_response(
            r#"{"date":"2024-03-01","merchant":"Acme","description":"office supplies","total":-4.5,"cardLast4":"4242"}"#,
        ))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let fields = extractor.extract(1, &request()).await.expect("extract ok");

    assert_eq!(fields.date, "2024-03-01");
    assert_eq!(fields.merchant, "Acme");
    assert_eq!(fields.total, -4.5);
    assert_eq!(fields.card_last4.as_deref(), Some("4242"));
}

#[tokio::test]
async fn malformed_date_is_a_schema_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(model_response(
            r#"{"date":"03/01/2024","merchant":"Acme","description":"x","total":1.0}"#,
        ))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::SchemaViolation);
}

#[tokio::test]
async fn non_json_candidate_text_is_a_schema_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(model_response("sorry, I cannot read this receipt"))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::SchemaViolation);
}

#[tokio::test]
async fn upstream_http_error_maps_to_status_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::HttpStatus(500));
}

#[tokio::test]
async fn empty_candidate_list_is_reported_distinctly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::EmptyResponse);
}

#[tokio::test]
async fn card_suffix_of_wrong_length_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(model_response(
            r#"{"date":"2024-03-01","merchant":"Acme","description":"x","total":1.0,"cardLast4":"42"}"#,
        ))
        .mount(&server)
        .await;

    let extractor = GeminiExtractor::new(settings(&server));
    let err = extractor.extract(1, &request()).await.unwrap_err();
    assert_eq!(err.kind, ExtractFailureKind::SchemaViolation);
}
