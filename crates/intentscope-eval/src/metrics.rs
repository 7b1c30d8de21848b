//! Classification metrics
//!
//! Builds the confusion matrix over a [`LabelUniverse`] and derives
//! per-class and aggregate precision, recall and F1 from it.
//!
//! Zero-division policy: any ratio whose denominator is zero is defined as
//! `0.0`. A class that is never predicted has precision 0, a class with no
//! gold examples has recall 0, and F1 is 0 when precision + recall is 0.
//! No metric is ever NaN.

use intentscope_core::{Error, LabelUniverse, PredictionRecord, Result};
use serde::{Deserialize, Serialize};

/// Counts of (true label, predicted label) co-occurrences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    universe: LabelUniverse,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Empty matrix over `universe`
    pub fn new(universe: LabelUniverse) -> Self {
        let n = universe.len();
        Self {
            universe,
            counts: vec![vec![0; n]; n],
        }
    }

    /// Count every record; each label must belong to the universe
    pub fn from_records(records: &[PredictionRecord], universe: LabelUniverse) -> Result<Self> {
        let mut matrix = Self::new(universe);
        for record in records {
            matrix.record(&record.gold, &record.predicted)?;
        }
        Ok(matrix)
    }

    /// Increment cell (gold, predicted)
    pub fn record(&mut self, gold: &str, predicted: &str) -> Result<()> {
        let row = self.position(gold)?;
        let col = self.position(predicted)?;
        self.counts[row][col] += 1;
        Ok(())
    }

    fn position(&self, label: &str) -> Result<usize> {
        self.universe.index_of(label).ok_or_else(|| {
            Error::config(format!("label '{}' is not part of the label universe", label))
        })
    }

    /// Row/column labels
    pub fn universe(&self) -> &LabelUniverse {
        &self.universe
    }

    /// Count for (true label, predicted label); 0 for labels outside the universe
    pub fn get(&self, gold: &str, predicted: &str) -> u64 {
        match (self.universe.index_of(gold), self.universe.index_of(predicted)) {
            (Some(row), Some(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    /// Count at (row, column) index
    pub fn cell(&self, row: usize, col: usize) -> u64 {
        self.counts[row][col]
    }

    /// Rows indexed by true label
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Number of examples whose true label is at `row`
    pub fn row_sum(&self, row: usize) -> u64 {
        self.counts[row].iter().sum()
    }

    /// Number of examples predicted as the label at `col`
    pub fn col_sum(&self, col: usize) -> u64 {
        self.counts.iter().map(|r| r[col]).sum()
    }

    /// Sum of all cells (equals the number of records counted)
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Sum of the diagonal
    pub fn correct(&self) -> u64 {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Largest cell value
    pub fn max(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Metrics of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Class label
    pub label: String,
    /// Correct predictions of this class
    pub true_positives: u64,
    /// Other classes predicted as this one
    pub false_positives: u64,
    /// This class predicted as another one
    pub false_negatives: u64,
    /// Gold examples of this class
    pub support: u64,
    /// TP / (TP + FP)
    pub precision: f64,
    /// TP / (TP + FN)
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
}

/// Aggregated precision/recall/F1 row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    /// Aggregated precision
    pub precision: f64,
    /// Aggregated recall
    pub recall: f64,
    /// Aggregated F1
    pub f1: f64,
    /// Total support
    pub support: u64,
}

/// Averaging strategy for aggregate rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Average {
    /// Pooled TP/FP/FN across classes
    Micro,
    /// Unweighted mean of per-class values
    Macro,
    /// Support-weighted mean of per-class values
    Weighted,
}

impl Average {
    /// Row name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Micro => "micro avg",
            Self::Macro => "macro avg",
            Self::Weighted => "weighted avg",
        }
    }
}

/// Everything computed for one evaluation batch
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Confusion matrix over the label universe
    pub matrix: ConfusionMatrix,
    /// Per-class metrics in universe order
    pub classes: Vec<ClassMetrics>,
    /// Correct / total
    pub accuracy: f64,
    /// Pooled averages
    pub micro: AverageMetrics,
    /// Unweighted averages
    pub macro_avg: AverageMetrics,
    /// Support-weighted averages
    pub weighted: AverageMetrics,
}

impl ClassificationReport {
    /// Label universe of the batch
    pub fn universe(&self) -> &LabelUniverse {
        self.matrix.universe()
    }

    /// Metrics of `label`, if it was observed
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.universe().index_of(label).map(|i| &self.classes[i])
    }

    /// Aggregate row for `average`
    pub fn average(&self, average: Average) -> &AverageMetrics {
        match average {
            Average::Micro => &self.micro,
            Average::Macro => &self.macro_avg,
            Average::Weighted => &self.weighted,
        }
    }

    /// Number of evaluated examples
    pub fn total(&self) -> u64 {
        self.matrix.total()
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Harmonic mean, 0 when both inputs are 0
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    safe_div(2.0 * precision * recall, precision + recall)
}

/// Compute the full report for `records` over `universe`
pub fn compute_metrics(
    records: &[PredictionRecord],
    universe: &LabelUniverse,
) -> Result<ClassificationReport> {
    let matrix = ConfusionMatrix::from_records(records, universe.clone())?;
    Ok(metrics_from_matrix(matrix))
}

/// Compute the report over the universe observed in `records`
pub fn evaluate(records: &[PredictionRecord]) -> Result<ClassificationReport> {
    compute_metrics(records, &LabelUniverse::from_records(records))
}

/// Derive per-class and aggregate metrics from a filled matrix
pub fn metrics_from_matrix(matrix: ConfusionMatrix) -> ClassificationReport {
    let classes: Vec<ClassMetrics> = matrix
        .universe()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let tp = matrix.cell(i, i);
            let fp = matrix.col_sum(i) - tp;
            let fn_ = matrix.row_sum(i) - tp;
            let precision = safe_div(tp as f64, (tp + fp) as f64);
            let recall = safe_div(tp as f64, (tp + fn_) as f64);

            ClassMetrics {
                label: label.to_string(),
                true_positives: tp,
                false_positives: fp,
                false_negatives: fn_,
                support: tp + fn_,
                precision,
                recall,
                f1: f1_score(precision, recall),
            }
        })
        .collect();

    let total = matrix.total();
    let accuracy = safe_div(matrix.correct() as f64, total as f64);

    let pooled_tp: u64 = classes.iter().map(|c| c.true_positives).sum();
    let pooled_fp: u64 = classes.iter().map(|c| c.false_positives).sum();
    let pooled_fn: u64 = classes.iter().map(|c| c.false_negatives).sum();
    let micro_precision = safe_div(pooled_tp as f64, (pooled_tp + pooled_fp) as f64);
    let micro_recall = safe_div(pooled_tp as f64, (pooled_tp + pooled_fn) as f64);
    let micro = AverageMetrics {
        precision: micro_precision,
        recall: micro_recall,
        f1: f1_score(micro_precision, micro_recall),
        support: total,
    };

    let n = classes.len() as f64;
    let macro_avg = AverageMetrics {
        precision: safe_div(classes.iter().map(|c| c.precision).sum(), n),
        recall: safe_div(classes.iter().map(|c| c.recall).sum(), n),
        f1: safe_div(classes.iter().map(|c| c.f1).sum(), n),
        support: total,
    };

    let weight = total as f64;
    let weighted_mean = |value: fn(&ClassMetrics) -> f64| {
        safe_div(
            classes.iter().map(|c| value(c) * c.support as f64).sum(),
            weight,
        )
    };
    let weighted = AverageMetrics {
        precision: weighted_mean(|c| c.precision),
        recall: weighted_mean(|c| c.recall),
        f1: weighted_mean(|c| c.f1),
        support: total,
    };

    ClassificationReport {
        matrix,
        classes,
        accuracy,
        micro,
        macro_avg,
        weighted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn records(pairs: &[(&str, &str)]) -> Vec<PredictionRecord> {
        pairs
            .iter()
            .map(|(g, p)| PredictionRecord::new(g, p))
            .collect()
    }

    fn reference_batch() -> Vec<PredictionRecord> {
        records(&[
            ("bar_chart", "bar_chart"),
            ("max_value", "min_value"),
            ("unknown", "unknown"),
        ])
    }

    #[test]
    fn test_confusion_matrix_cells() {
        let report = evaluate(&reference_batch()).unwrap();
        let m = &report.matrix;

        assert_eq!(m.get("max_value", "min_value"), 1);
        assert_eq!(m.get("bar_chart", "bar_chart"), 1);
        assert_eq!(m.get("unknown", "unknown"), 1);
        assert_eq!(m.get("min_value", "max_value"), 0);
        assert_eq!(m.total(), 3);
        assert_eq!(
            m.universe().labels(),
            &["bar_chart", "max_value", "min_value", "unknown"]
        );
    }

    #[test]
    fn test_per_class_metrics() {
        let report = evaluate(&reference_batch()).unwrap();

        let bar = report.class("bar_chart").unwrap();
        assert_eq!(bar.precision, 1.0);
        assert_eq!(bar.recall, 1.0);
        assert_eq!(bar.f1, 1.0);

        let max = report.class("max_value").unwrap();
        assert_eq!(max.precision, 0.0);
        assert_eq!(max.recall, 0.0);
        assert_eq!(max.false_negatives, 1);
        assert_eq!(max.support, 1);

        let min = report.class("min_value").unwrap();
        assert_eq!(min.precision, 0.0);
        assert_eq!(min.false_positives, 1);
        assert_eq!(min.support, 0);
        assert_eq!(min.f1, 0.0);
    }

    #[test]
    fn test_micro_f1_equals_accuracy() {
        let report = evaluate(&reference_batch()).unwrap();
        assert!((report.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.micro.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.micro.precision, report.micro.recall);
    }

    #[test]
    fn test_macro_and_weighted_averages() {
        let report = evaluate(&reference_batch()).unwrap();

        // per-class f1: bar 1, max 0, min 0, unknown 1
        assert!((report.macro_avg.f1 - 0.5).abs() < 1e-12);
        // supports: bar 1, max 1, min 0, unknown 1
        assert!((report.weighted.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.weighted.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.weighted.support, 3);
    }

    #[test]
    fn test_zero_support_never_predicted_is_zero() {
        let universe = LabelUniverse::new(["pie_chart", "show_table"]);
        let report = compute_metrics(&records(&[("show_table", "show_table")]), &universe).unwrap();

        let pie = report.class("pie_chart").unwrap();
        assert_eq!((pie.precision, pie.recall, pie.f1), (0.0, 0.0, 0.0));
        assert!(!pie.f1.is_nan());
    }

    #[test]
    fn test_empty_batch() {
        let report = evaluate(&[]).unwrap();
        assert!(report.classes.is_empty());
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.macro_avg.f1, 0.0);
        assert_eq!(report.weighted.f1, 0.0);
    }

    #[test]
    fn test_label_outside_universe_rejected() {
        let universe = LabelUniverse::new(["bar_chart"]);
        let result = compute_metrics(&records(&[("bar_chart", "pie_chart")]), &universe);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_idempotent() {
        let batch = reference_batch();
        assert_eq!(evaluate(&batch).unwrap(), evaluate(&batch).unwrap());
    }

    fn label() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("bar_chart".to_string()),
            Just("line_chart".to_string()),
            Just("max_value".to_string()),
            Just("unknown".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn matrix_sum_equals_record_count(pairs in proptest::collection::vec((label(), label()), 0..60)) {
            let batch: Vec<_> = pairs.iter().map(|(g, p)| PredictionRecord::new(g, p)).collect();
            let report = evaluate(&batch).unwrap();
            prop_assert_eq!(report.total(), batch.len() as u64);
            prop_assert!((report.micro.f1 - report.accuracy).abs() < 1e-12);
        }

        #[test]
        fn report_independent_of_record_order(pairs in proptest::collection::vec((label(), label()), 0..40)) {
            let mut batch: Vec<_> = pairs.iter().map(|(g, p)| PredictionRecord::new(g, p)).collect();
            let forward = evaluate(&batch).unwrap();
            batch.reverse();
            let backward = evaluate(&batch).unwrap();
            prop_assert_eq!(forward.matrix, backward.matrix);
            prop_assert_eq!(forward.classes, backward.classes);
        }
    }
}
