//! Backend resolution and adapter tests
//!
//! Mock backends exercise the resolver's ordering and fall-through; a
//! minimal in-process HTTP responder exercises the external adapter.

use async_trait::async_trait;
use intentscope_classifiers::{
    BackendCandidate, BackendKind, ExternalBackendConfig, ExternalClassifier, IntentBackend,
    RuleClassifier, RuntimeResolver,
};
use intentscope_core::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Backend that always answers the same label
struct MockBackend {
    label: String,
    kind: BackendKind,
    call_count: AtomicU32,
}

impl MockBackend {
    fn new(kind: BackendKind, label: &str) -> Self {
        Self {
            label: label.to_string(),
            kind,
            call_count: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl IntentBackend for MockBackend {
    async fn predict(&self, _text: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(format!("  {}  ", self.label))
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }
}

fn failing_candidate(kind: BackendKind) -> BackendCandidate {
    BackendCandidate::new(kind, move || {
        Err(Error::config(format!("{} not installed", kind)))
    })
}

#[tokio::test]
async fn test_first_constructible_candidate_wins() {
    let resolver = RuntimeResolver::new()
        .with_candidate(failing_candidate(BackendKind::External))
        .with_candidate(BackendCandidate::new(BackendKind::Artifact, || {
            Ok(Arc::new(MockBackend::new(BackendKind::Artifact, "pie_chart")) as Arc<dyn IntentBackend>)
        }))
        .with_candidate(BackendCandidate::new(BackendKind::Rules, || {
            Ok(Arc::new(RuleClassifier::default()) as Arc<dyn IntentBackend>)
        }));

    let resolved = resolver.resolve().unwrap();
    assert_eq!(resolved.kind(), BackendKind::Artifact);

    // labels are trimmed at the backend boundary
    assert_eq!(resolved.predict("anything").await.unwrap(), "pie_chart");
}

#[tokio::test]
async fn test_later_candidates_not_constructed() {
    let constructed = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&constructed);

    let resolver = RuntimeResolver::new()
        .with_candidate(BackendCandidate::new(BackendKind::External, || {
            Ok(Arc::new(MockBackend::new(BackendKind::External, "show_table")) as Arc<dyn IntentBackend>)
        }))
        .with_candidate(BackendCandidate::new(BackendKind::Rules, move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(Arc::new(RuleClassifier::default()) as Arc<dyn IntentBackend>)
        }));

    let resolved = resolver.resolve().unwrap();
    assert_eq!(resolved.kind(), BackendKind::External);
    assert_eq!(constructed.load(Ordering::Relaxed), 0);
}

#[test]
fn test_all_candidates_failing() {
    let resolver = RuntimeResolver::new()
        .with_candidate(failing_candidate(BackendKind::External))
        .with_candidate(failing_candidate(BackendKind::Artifact));

    match resolver.resolve() {
        Err(Error::BackendUnavailable(reason)) => {
            assert!(reason.contains("external not installed"));
            assert!(reason.contains("artifact not installed"));
        }
        other => panic!("expected BackendUnavailable, got {:?}", other),
    }
}

/// Serve `responses` in order, one connection each, and return the base URL
async fn serve(responses: Vec<(u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;

            let reason = if status == 200 { "OK" } else { "Internal Server Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

fn external_config(base: &str, fallback: Option<&str>) -> ExternalBackendConfig {
    ExternalBackendConfig {
        url: format!("{}/predict", base),
        fallback_url: fallback.map(|f| format!("{}/fallback", f)),
        timeout_ms: 2_000,
    }
}

#[tokio::test]
async fn test_external_extracts_name_field() {
    let base = serve(vec![(200, r#"{"name": "max_value", "score": 0.81}"#)]).await;
    let classifier = ExternalClassifier::new(&external_config(&base, None)).unwrap();

    assert_eq!(classifier.predict("highest rent").await.unwrap(), "max_value");
}

#[tokio::test]
async fn test_external_uses_fallback_endpoint() {
    let base = serve(vec![(500, "{}"), (200, "\"value_frequency\"")]).await;
    let classifier = ExternalClassifier::new(&external_config(&base, Some(&base))).unwrap();

    assert_eq!(classifier.predict("how many rows").await.unwrap(), "value_frequency");
}

#[tokio::test]
async fn test_external_failure_surfaces_after_fallback() {
    let base = serve(vec![(500, "{}"), (200, "null")]).await;
    let classifier = ExternalClassifier::new(&external_config(&base, Some(&base))).unwrap();

    let err = classifier.predict("how many rows").await.unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("external backend failed to predict"));
    assert!(message.contains("fallback"));
}
