//! IntentScope Evaluation
//!
//! Scores intent predictions against gold labels.
//!
//! - `dataset`: CSV input with schema validation
//! - `metrics`: confusion matrix and per-class/micro/macro/weighted metrics
//! - `report`: JSON, text and CSV reports
//! - `heatmap`: PNG rendering of the confusion matrix
//! - `driver`: end-to-end evaluation runs

pub mod dataset;
pub mod driver;
pub mod heatmap;
pub mod metrics;
pub mod report;

pub use dataset::{read_examples, read_prediction_records, ColumnSpec};
pub use driver::{predict_all, EvaluationDriver, EvaluationOutcome};
pub use metrics::{
    compute_metrics, evaluate, Average, AverageMetrics, ClassMetrics, ClassificationReport,
    ConfusionMatrix,
};
pub use report::{ReportPaths, ReportWriter};
