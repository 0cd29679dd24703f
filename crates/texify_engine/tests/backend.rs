use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use texify_engine::{
    BackendSettings, Compilation, ConversionBackend, FailureKind, ReqwestBackend,
};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let settings = BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    };
    ReqwestBackend::new(settings).expect("backend")
}

#[tokio::test]
async fn successful_conversion_resolves_document_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_json(json!({ "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "latex_content": "\\documentclass{article}",
            "compilation": { "success": true, "pdf_path": "/tmp/x/out.pdf" },
            "pdf_url": "/files/out.pdf",
            "attempts_used": 2
        })))
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .request_conversion("hello")
        .await
        .expect("conversion ok");

    assert_eq!(response.source_text, "\\documentclass{article}");
    assert_eq!(response.attempts_used, Some(2));
    assert_eq!(
        response.compilation,
        Compilation::Succeeded {
            document: Url::parse(&format!("{}/files/out.pdf", server.uri())).unwrap()
        }
    );
}

#[tokio::test]
async fn compilation_failure_carries_backend_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "latex_content": "\\begin{document",
            "compilation": { "success": false, "error": "Undefined control sequence" },
            "pdf_url": null
        })))
        .mount(&server)
        .await;

    let response = backend_for(&server)
        .request_conversion("hello")
        .await
        .expect("exchange ok");

    assert_eq!(
        response.compilation,
        Compilation::Failed {
            reason: "Undefined control sequence".to_string()
        }
    );
    assert_eq!(response.attempts_used, None);
}

#[tokio::test]
async fn compiled_without_location_is_reported_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latex_content": "x",
            "compilation": { "success": true }
        })))
        .mount(&server)
        .await;

    let response = backend_for(&server).request_conversion("x").await.unwrap();
    assert_eq!(
        response.compilation,
        Compilation::Failed {
            reason: "no compiled document was returned".to_string()
        }
    );
}

#[tokio::test]
async fn error_status_uses_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Missing 'text' field in request body" })),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).request_conversion("").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.to_string(), "Missing 'text' field in request body");
}

#[tokio::test]
async fn error_status_without_body_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).request_conversion("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(err.message, "HTTP error! status: 502");
}

#[tokio::test]
async fn unparsable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend_for(&server).request_conversion("x").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let settings = BackendSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_secs(2),
        ..BackendSettings::default()
    };
    let err = ReqwestBackend::new(settings)
        .unwrap()
        .request_conversion("x")
        .await
        .unwrap_err();
    assert!(
        matches!(err.kind, FailureKind::Network | FailureKind::Timeout),
        "unexpected {err:?}"
    );
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let settings = BackendSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    };
    let err = ReqwestBackend::new(settings)
        .unwrap()
        .request_conversion("x")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetch_document_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/out.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.7 body", "application/pdf"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let location = backend.resolve_location("/pdf/out.pdf").unwrap();
    let bytes = backend.fetch_document(&location).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7 body");
}

#[tokio::test]
async fn fetch_document_rejects_oversized_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let settings = BackendSettings {
        base_url: server.uri(),
        max_document_bytes: 10,
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(settings).unwrap();
    let location = backend.resolve_location("/pdf/big.pdf").unwrap();
    let err = backend.fetch_document(&location).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetch_document_reports_missing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pdf/gone.pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "PDF file not found" })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let location = backend.resolve_location("/pdf/gone.pdf").unwrap();
    let err = backend.fetch_document(&location).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "PDF file not found");
}

#[tokio::test]
async fn health_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "message": "LaTeX Converter API is running"
        })))
        .mount(&server)
        .await;

    let health = backend_for(&server).health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.message.as_deref(), Some("LaTeX Converter API is running"));
}

#[test]
fn locations_resolve_against_base_with_or_without_trailing_slash() {
    let settings = BackendSettings {
        base_url: "http://localhost:5000/".to_string(),
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(settings).unwrap();
    assert_eq!(
        backend.resolve_location("/pdf/a.pdf").unwrap().as_str(),
        "http://localhost:5000/pdf/a.pdf"
    );
    assert_eq!(
        backend
            .resolve_location("https://cdn.example.com/a.pdf")
            .unwrap()
            .as_str(),
        "https://cdn.example.com/a.pdf"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let settings = BackendSettings {
        base_url: "not a url".to_string(),
        ..BackendSettings::default()
    };
    let err = ReqwestBackend::new(settings).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
