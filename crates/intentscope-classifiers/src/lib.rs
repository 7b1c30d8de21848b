//! IntentScope Classifiers
//!
//! Short-text intent classification for data-exploration queries.
//!
//! Three prediction backends are available, tried in this order at startup:
//! - External: a hosted NLP platform reached over HTTP
//! - Artifact: a persisted bag-of-words model loaded from disk
//! - Rules: the deterministic pattern classifier, which always constructs
//!
//! Whatever backend is selected, callers only see `predict(text) -> label`.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod external;
pub mod patterns;
pub mod resolver;
pub mod rules;

pub use artifact::{ArtifactClassifier, ArtifactModel, IntentWeights};
pub use classifier::{BackendKind, IntentBackend, IntentPrediction};
pub use config::{
    ArtifactBackendConfig, BackendConfig, ExternalBackendConfig, RulesBackendConfig,
    DEFAULT_TIMEOUT_MS,
};
pub use external::ExternalClassifier;
pub use patterns::{IntentRules, IntentRulesSpec, PatternTable};
pub use resolver::{BackendCandidate, BackendFactory, ResolvedBackend, RuntimeResolver};
pub use rules::RuleClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{BackendKind, IntentBackend};
    pub use crate::patterns::PatternTable;
    pub use crate::resolver::{ResolvedBackend, RuntimeResolver};
    pub use crate::rules::RuleClassifier;
}
