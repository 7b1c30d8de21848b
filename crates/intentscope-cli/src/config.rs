//! Evaluation configuration

use crate::cli::{BackendArgs, ReportArgs};
use intentscope_classifiers::{ArtifactBackendConfig, BackendConfig, ExternalBackendConfig};
use intentscope_eval::ColumnSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings of the `intentscope` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Report directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Decimal digits in the text report
    #[serde(default = "default_digits")]
    pub digits: usize,

    /// Input column names
    #[serde(default)]
    pub columns: ColumnSpec,

    /// Prediction backends
    #[serde(default)]
    pub backends: BackendConfig,
}

impl EvalConfig {
    /// Load configuration from file if present, defaults otherwise
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        Ok(config)
    }

    /// Apply report overrides from the command line
    pub fn apply_report_args(&mut self, args: &ReportArgs) {
        if let Some(dir) = &args.outdir {
            self.output_dir = dir.clone();
        }

        if let Some(digits) = args.digits {
            self.digits = digits;
        }
    }

    /// Apply backend overrides from the command line
    pub fn apply_backend_args(&mut self, args: &BackendArgs) {
        if let Some(url) = &args.external_url {
            match &mut self.backends.external {
                Some(external) => external.url = url.clone(),
                None => self.backends.external = Some(ExternalBackendConfig::new(url.clone())),
            }
        }

        if let Some(path) = &args.artifact {
            self.backends.artifact = Some(ArtifactBackendConfig { path: path.clone() });
        }

        if let Some(path) = &args.patterns {
            self.backends.rules.patterns = Some(path.clone());
        }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            digits: default_digits(),
            columns: ColumnSpec::default(),
            backends: BackendConfig::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("eval_results")
}

fn default_digits() -> usize {
    2
}
