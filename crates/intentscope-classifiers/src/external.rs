//! Hosted NLP platform backend
//!
//! Posts `{"text": ...}` to the platform's prediction endpoint. Platforms
//! answer either with a prediction object (`{"name": ...}` or
//! `{"intent": {"name": ...}}`) or with a bare label; the adapter below
//! reduces all of them to a plain label string.

use crate::classifier::{BackendKind, IntentBackend};
use crate::config::ExternalBackendConfig;
use intentscope_core::{Error, Result};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a hosted intent classifier
#[derive(Debug, Clone)]
pub struct ExternalClassifier {
    client: reqwest::Client,
    url: Url,
    fallback_url: Option<Url>,
}

impl ExternalClassifier {
    /// Build the client; fails when an endpoint is malformed
    pub fn new(config: &ExternalBackendConfig) -> Result<Self> {
        let url = parse_endpoint(&config.url)?;
        let fallback_url = config
            .fallback_url
            .as_deref()
            .map(parse_endpoint)
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            fallback_url,
        })
    }

    async fn predict_at(&self, url: &Url, text: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .post(url.clone())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("{} returned {}", url, status));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        extract_label(&body).ok_or_else(|| format!("{} returned no intent name", url))
    }
}

#[async_trait::async_trait]
impl IntentBackend for ExternalClassifier {
    async fn predict(&self, text: &str) -> Result<String> {
        let primary_err = match self.predict_at(&self.url, text).await {
            Ok(label) => return Ok(label),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback_url else {
            return Err(Error::prediction(BackendKind::External.as_str(), primary_err));
        };

        warn!(
            "Primary endpoint failed ({}), retrying at {}",
            primary_err, fallback
        );

        self.predict_at(fallback, text).await.map_err(|e| {
            Error::prediction(
                BackendKind::External.as_str(),
                format!("primary: {}; fallback: {}", primary_err, e),
            )
        })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::External
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::config(format!("invalid endpoint '{}': {}", raw, e)))
}

/// Reduce a platform response body to an intent label
pub fn extract_label(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let label = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => label_from_value(&value)?,
        // not JSON: the body itself is the label
        Err(_) => trimmed.to_string(),
    };

    debug!("External prediction: {}", label);
    let label = label.trim().to_string();
    (!label.is_empty()).then_some(label)
}

fn label_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => match (map.get("name"), map.get("intent")) {
            (Some(name), _) if !name.is_null() => label_from_value(name),
            (_, Some(intent)) => label_from_value(intent),
            _ => None,
        },
        Value::Null | Value::Array(_) => None,
    }
}
