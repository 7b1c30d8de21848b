//! Rule-based intent classifier
//!
//! Lower-cases and trims the query, then returns the label of the first
//! matching rule, walking the pattern table label by label and rule by
//! rule. Total over its input: every string yields a label.

use crate::classifier::{BackendKind, IntentBackend};
use crate::patterns::PatternTable;
use intentscope_core::{Result, UNKNOWN_INTENT};
use std::sync::Arc;

/// Deterministic first-match-wins intent classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    table: Arc<PatternTable>,
}

impl RuleClassifier {
    /// Create a classifier over `table`
    pub fn new(table: PatternTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Underlying pattern table
    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Classify `text` into exactly one label
    pub fn classify(&self, text: &str) -> String {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return UNKNOWN_INTENT.to_string();
        }

        self.table
            .intents()
            .iter()
            .find(|rules| rules.matches(&normalized))
            .map(|rules| rules.label().to_string())
            .unwrap_or_else(|| UNKNOWN_INTENT.to_string())
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(PatternTable::default())
    }
}

#[async_trait::async_trait]
impl IntentBackend for RuleClassifier {
    async fn predict(&self, text: &str) -> Result<String> {
        Ok(self.classify(text))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Rules
    }
}
