//! Persisted standalone classifier artifact
//!
//! The artifact is a bag-of-words linear model stored as JSON. Each intent
//! carries a bias and per-token weights; the intent with the highest score
//! wins and ties go to the intent declared first. Text that shares no token
//! with the model falls back to the artifact's `fallback_label`.

use crate::classifier::{BackendKind, IntentBackend, IntentPrediction};
use intentscope_core::{Error, Result, UNKNOWN_INTENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Weights of one intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentWeights {
    /// Intent label
    pub label: String,

    /// Constant term
    #[serde(default)]
    pub bias: f32,

    /// Token weights
    #[serde(default)]
    pub weights: BTreeMap<String, f32>,
}

/// On-disk artifact format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactModel {
    /// Model name
    pub name: String,

    /// Model version
    #[serde(default)]
    pub version: Option<String>,

    /// Label returned when no token of the text is known to the model
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,

    /// Intents in tie-break order
    pub labels: Vec<IntentWeights>,
}

fn default_fallback_label() -> String {
    UNKNOWN_INTENT.to_string()
}

/// Classifier backed by a persisted [`ArtifactModel`]
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    model: ArtifactModel,
}

impl ArtifactClassifier {
    /// Wrap an in-memory model
    pub fn new(model: ArtifactModel) -> Result<Self> {
        if model.labels.is_empty() {
            return Err(Error::config(format!(
                "artifact '{}' declares no intents",
                model.name
            )));
        }
        Ok(Self { model })
    }

    /// Load a model from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let model: ArtifactModel = serde_json::from_str(&content)?;

        info!(
            "Loaded classifier artifact '{}' ({} intents) from {}",
            model.name,
            model.labels.len(),
            path.display()
        );

        Self::new(model)
    }

    /// Model metadata and weights
    pub fn model(&self) -> &ArtifactModel {
        &self.model
    }

    /// Score every intent and return the winning prediction
    pub fn predict_intent(&self, text: &str) -> IntentPrediction {
        let tokens = tokenize(text);

        let known = tokens
            .iter()
            .any(|t| self.model.labels.iter().any(|l| l.weights.contains_key(t.as_str())));
        if !known {
            return IntentPrediction::new(self.model.fallback_label.clone(), 0.0);
        }

        let mut best: Option<(&IntentWeights, f32)> = None;
        for intent in &self.model.labels {
            let score = intent.bias
                + tokens
                    .iter()
                    .filter_map(|t| intent.weights.get(t.as_str()))
                    .sum::<f32>();

            // strict comparison keeps the earliest intent on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((intent, score));
            }
        }

        match best {
            Some((intent, score)) => IntentPrediction::new(intent.label.clone(), score),
            None => IntentPrediction::new(self.model.fallback_label.clone(), 0.0),
        }
    }
}

#[async_trait::async_trait]
impl IntentBackend for ArtifactClassifier {
    async fn predict(&self, text: &str) -> Result<String> {
        Ok(self.predict_intent(text).name)
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Artifact
    }
}

/// Lower-cased ASCII alphanumeric runs
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_json() -> &'static str {
        r#"{
  "name": "intent-bow",
  "version": "3",
  "labels": [
    {"label": "max_value", "bias": 0.0, "weights": {"highest": 2.0, "max": 2.0, "price": 0.5}},
    {"label": "min_value", "bias": 0.0, "weights": {"lowest": 2.0, "min": 2.0, "price": 0.5}},
    {"label": "pie_chart", "bias": -0.5, "weights": {"share": 1.5}}
  ]
}"#
    }

    fn classifier() -> ArtifactClassifier {
        let model: ArtifactModel = serde_json::from_str(model_json()).unwrap();
        ArtifactClassifier::new(model).unwrap()
    }

    #[test]
    fn test_highest_score_wins() {
        let classifier = classifier();
        assert_eq!(classifier.predict_intent("lowest price").name, "min_value");
        assert_eq!(classifier.predict_intent("HIGHEST price").name, "max_value");
    }

    #[test]
    fn test_ties_resolve_to_first_intent() {
        let prediction = classifier().predict_intent("price");
        assert_eq!(prediction.name, "max_value");
        assert_eq!(prediction.score, 0.5);
    }

    #[test]
    fn test_unknown_tokens_fall_back() {
        let classifier = classifier();
        assert_eq!(classifier.predict_intent("good morning").name, UNKNOWN_INTENT);
        assert_eq!(classifier.predict_intent("").name, UNKNOWN_INTENT);
    }

    #[test]
    fn test_empty_model_rejected() {
        let model = ArtifactModel {
            name: "empty".to_string(),
            version: None,
            fallback_label: default_fallback_label(),
            labels: vec![],
        };
        assert!(matches!(ArtifactClassifier::new(model), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, model_json()).unwrap();

        let classifier = ArtifactClassifier::load(&path).unwrap();
        assert_eq!(classifier.model().name, "intent-bow");
        assert_eq!(classifier.kind(), BackendKind::Artifact);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ArtifactClassifier::load("/nonexistent/model.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
