//! Prediction backend trait and common types

use async_trait::async_trait;
use intentscope_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for every intent prediction backend
///
/// Implementations adapt whatever their underlying classifier returns into
/// a single plain label.
#[async_trait]
pub trait IntentBackend: Send + Sync {
    /// Predict the intent label of `text`
    async fn predict(&self, text: &str) -> Result<String>;

    /// Which kind of backend this is
    fn kind(&self) -> BackendKind;
}

/// Discriminator recorded for the backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted NLP platform classifier
    External,
    /// Persisted standalone classifier artifact
    Artifact,
    /// Rule-based pattern classifier
    Rules,
}

impl BackendKind {
    /// Resolution priority, highest first
    pub const PRIORITY: [BackendKind; 3] = [Self::External, Self::Artifact, Self::Rules];

    /// Stable tag used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Artifact => "artifact",
            Self::Rules => "rules",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction object returned by model-style classifiers
///
/// Only `name` crosses the backend boundary; the score stays internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    /// Predicted intent name
    pub name: String,

    /// Raw model score of the winning intent
    #[serde(default)]
    pub score: f32,
}

impl IntentPrediction {
    /// Create a new prediction
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
