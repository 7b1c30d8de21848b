//! Configuration for prediction backends

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-request timeout of the external backend when none is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Configuration for every backend candidate
///
/// Candidates are always tried in the fixed order external, artifact,
/// rules; configuration only decides which of them can be constructed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Hosted platform classifier
    #[serde(default)]
    pub external: Option<ExternalBackendConfig>,

    /// Persisted classifier artifact
    #[serde(default)]
    pub artifact: Option<ArtifactBackendConfig>,

    /// Rule-based classifier
    #[serde(default)]
    pub rules: RulesBackendConfig,
}

/// Hosted platform endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalBackendConfig {
    /// Primary prediction endpoint
    pub url: String,

    /// Secondary endpoint tried when the primary one fails
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ExternalBackendConfig {
    /// Endpoint with no fallback and the default timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fallback_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Persisted artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBackendConfig {
    /// JSON model file
    pub path: PathBuf,
}

/// Rule-based classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesBackendConfig {
    /// Whether the rules candidate takes part in resolution
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// YAML pattern table replacing the built-in one
    #[serde(default)]
    pub patterns: Option<PathBuf>,
}

impl Default for RulesBackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: None,
        }
    }
}

impl BackendConfig {
    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}
