//! Core types for IntentScope

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reserved label returned when no rule matches or the text is empty
pub const UNKNOWN_INTENT: &str = "unknown";

/// Normalize a label for comparison (labels are case-sensitive, whitespace is not significant)
pub fn normalize_label(label: &str) -> String {
    label.trim().to_string()
}

/// A labeled evaluation example read from one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Free-form query text
    pub text: String,

    /// Human-annotated intent
    pub gold_intent: String,
}

impl Example {
    /// Create a new example; the gold label is trimmed
    pub fn new(text: impl Into<String>, gold_intent: &str) -> Self {
        Self {
            text: text.into(),
            gold_intent: normalize_label(gold_intent),
        }
    }
}

/// Gold and predicted label for one example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Gold (true) label
    pub gold: String,

    /// Predicted label
    pub predicted: String,
}

impl PredictionRecord {
    /// Create a new record; both labels are trimmed
    pub fn new(gold: &str, predicted: &str) -> Self {
        Self {
            gold: normalize_label(gold),
            predicted: normalize_label(predicted),
        }
    }

    /// Whether the prediction matches the gold label
    pub fn is_correct(&self) -> bool {
        self.gold == self.predicted
    }
}

/// Sorted, deduplicated set of labels observed in a batch
///
/// Ordering is lexicographic and independent of the order in which labels
/// were observed, so every report derived from it is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelUniverse {
    labels: Vec<String>,
}

impl LabelUniverse {
    /// Build the universe from arbitrary labels
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = labels
            .into_iter()
            .map(|l| normalize_label(l.as_ref()))
            .collect();
        Self {
            labels: set.into_iter().collect(),
        }
    }

    /// Union of every gold and predicted label in `records`
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        Self::new(
            records
                .iter()
                .flat_map(|r| [r.gold.as_str(), r.predicted.as_str()]),
        )
    }

    /// Labels in report order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Position of `label` in report order
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no labels were observed
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate labels in report order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_universe_is_sorted_union() {
        let records = vec![
            PredictionRecord::new("max_value", "min_value"),
            PredictionRecord::new("bar_chart", "bar_chart"),
            PredictionRecord::new(" unknown ", "unknown"),
        ];

        let universe = LabelUniverse::from_records(&records);
        assert_eq!(
            universe.labels(),
            &["bar_chart", "max_value", "min_value", "unknown"]
        );
        assert_eq!(universe.index_of("min_value"), Some(2));
        assert_eq!(universe.index_of("pie_chart"), None);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let universe = LabelUniverse::new(["Bar_Chart", "bar_chart"]);
        assert_eq!(universe.len(), 2);
    }

    #[test]
    fn test_record_correctness_ignores_padding() {
        assert!(PredictionRecord::new("pie_chart ", "  pie_chart").is_correct());
        assert!(!PredictionRecord::new("pie_chart", "bar_chart").is_correct());
    }

    proptest! {
        #[test]
        fn universe_independent_of_insertion_order(mut labels in proptest::collection::vec("[a-z_]{1,8}", 0..20)) {
            let forward = LabelUniverse::new(labels.iter());
            labels.reverse();
            let backward = LabelUniverse::new(labels.iter());
            prop_assert_eq!(forward, backward);
        }
    }
}
