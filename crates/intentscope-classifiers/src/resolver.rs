//! Runtime backend resolution
//!
//! Candidates are constructor attempts tried in priority order. The first
//! one that builds wins; any failure is logged and resolution moves on to
//! the next candidate. Only when every candidate fails does resolution
//! itself fail.

use crate::artifact::ArtifactClassifier;
use crate::classifier::{BackendKind, IntentBackend};
use crate::config::BackendConfig;
use crate::external::ExternalClassifier;
use crate::patterns::PatternTable;
use crate::rules::RuleClassifier;
use intentscope_core::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Constructor attempt for one backend
pub type BackendFactory = Box<dyn Fn() -> Result<Arc<dyn IntentBackend>> + Send + Sync>;

/// One entry of the resolution order
pub struct BackendCandidate {
    kind: BackendKind,
    factory: BackendFactory,
}

impl BackendCandidate {
    /// Create a candidate from a constructor
    pub fn new<F>(kind: BackendKind, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn IntentBackend>> + Send + Sync + 'static,
    {
        Self {
            kind,
            factory: Box::new(factory),
        }
    }

    /// Backend this candidate constructs
    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

impl std::fmt::Debug for BackendCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCandidate")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Backend selected for a run, tagged with its kind
#[derive(Clone)]
pub struct ResolvedBackend {
    kind: BackendKind,
    backend: Arc<dyn IntentBackend>,
}

impl ResolvedBackend {
    /// Tag the selected backend
    pub fn new(kind: BackendKind, backend: Arc<dyn IntentBackend>) -> Self {
        Self { kind, backend }
    }

    /// Discriminator of the selected backend
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Predict the intent label of `text`; the label is trimmed
    pub async fn predict(&self, text: &str) -> Result<String> {
        let label = self.backend.predict(text).await?;
        Ok(label.trim().to_string())
    }
}

impl std::fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedBackend")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered list of backend candidates
#[derive(Debug, Default)]
pub struct RuntimeResolver {
    candidates: Vec<BackendCandidate>,
}

impl RuntimeResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate; candidates are tried in insertion order
    pub fn with_candidate(mut self, candidate: BackendCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// One candidate per backend kind, in `BackendKind::PRIORITY` order
    pub fn from_config(config: &BackendConfig) -> Self {
        BackendKind::PRIORITY
            .iter()
            .fold(Self::new(), |resolver, &kind| {
                resolver.with_candidate(configured_candidate(kind, config))
            })
    }

    /// Candidate kinds in resolution order
    pub fn order(&self) -> Vec<BackendKind> {
        self.candidates.iter().map(|c| c.kind).collect()
    }

    /// Select the first candidate that constructs
    pub fn resolve(&self) -> Result<ResolvedBackend> {
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            match (candidate.factory)() {
                Ok(backend) => {
                    info!("Using {} backend", candidate.kind);
                    return Ok(ResolvedBackend::new(candidate.kind, backend));
                }
                Err(e) => {
                    warn!("{} backend unavailable: {}", candidate.kind, e);
                    failures.push(format!("{}: {}", candidate.kind, e));
                }
            }
        }

        if failures.is_empty() {
            return Err(Error::backend_unavailable("no backend candidates"));
        }
        Err(Error::backend_unavailable(failures.join("; ")))
    }
}

fn configured_candidate(kind: BackendKind, config: &BackendConfig) -> BackendCandidate {
    match kind {
        BackendKind::External => {
            let external = config.external.clone();
            BackendCandidate::new(kind, move || {
                let cfg = external
                    .as_ref()
                    .ok_or_else(|| Error::config("no external endpoint configured"))?;
                Ok(Arc::new(ExternalClassifier::new(cfg)?) as Arc<dyn IntentBackend>)
            })
        }
        BackendKind::Artifact => {
            let artifact = config.artifact.clone();
            BackendCandidate::new(kind, move || {
                let cfg = artifact
                    .as_ref()
                    .ok_or_else(|| Error::config("no artifact path configured"))?;
                Ok(Arc::new(ArtifactClassifier::load(&cfg.path)?) as Arc<dyn IntentBackend>)
            })
        }
        BackendKind::Rules => {
            let rules = config.rules.clone();
            BackendCandidate::new(kind, move || {
                if !rules.enabled {
                    return Err(Error::config("rules backend disabled"));
                }
                let table = match &rules.patterns {
                    Some(path) => PatternTable::from_file(path)?,
                    None => PatternTable::default(),
                };
                Ok(Arc::new(RuleClassifier::new(table)) as Arc<dyn IntentBackend>)
            })
        }
    }
}
