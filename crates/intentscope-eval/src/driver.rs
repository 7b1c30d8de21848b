//! Evaluation driver
//!
//! One run goes through: validate input schema, resolve the backend,
//! predict every example in input order, compute metrics, write reports.
//! A failed prediction aborts the run; no partial report is produced.

use crate::dataset::{self, ColumnSpec};
use crate::metrics::{compute_metrics, ClassificationReport};
use crate::report::{ReportPaths, ReportWriter};
use intentscope_classifiers::{BackendKind, ResolvedBackend, RuntimeResolver};
use intentscope_core::{Example, LabelUniverse, PredictionRecord, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of one evaluation run
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    /// Backend that produced the predictions (`None` when scoring precomputed predictions)
    pub backend: Option<BackendKind>,
    /// Gold/predicted pairs in input order
    pub records: Vec<PredictionRecord>,
    /// Sorted labels of the batch
    pub universe: LabelUniverse,
    /// Confusion matrix and metrics
    pub report: ClassificationReport,
    /// Human-readable classification report
    pub text_report: String,
    /// Files written, when an output directory was configured
    pub written: Option<ReportPaths>,
}

/// Orchestrates backend resolution, prediction, metrics and reports
#[derive(Debug)]
pub struct EvaluationDriver {
    resolver: RuntimeResolver,
    columns: ColumnSpec,
    writer: ReportWriter,
    output_dir: Option<PathBuf>,
}

impl EvaluationDriver {
    /// Create a driver using `resolver` and default columns
    pub fn new(resolver: RuntimeResolver) -> Self {
        Self {
            resolver,
            columns: ColumnSpec::default(),
            writer: ReportWriter::default(),
            output_dir: None,
        }
    }

    /// Input column names
    pub fn with_columns(mut self, columns: ColumnSpec) -> Self {
        self.columns = columns;
        self
    }

    /// Report renderer
    pub fn with_writer(mut self, writer: ReportWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Directory receiving the report files (created if absent)
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Evaluate the backend on a CSV table of (text, gold) rows
    pub async fn run<R: Read>(&self, input: R) -> Result<EvaluationOutcome> {
        let examples = dataset::read_examples(input, &self.columns)?;
        info!("Loaded {} examples", examples.len());

        let backend = self.resolver.resolve()?;
        info!("Prediction method: {}", backend.kind());

        let records = predict_all(&backend, &examples).await?;
        self.finish(Some(backend.kind()), records)
    }

    /// Evaluate the backend on a CSV file
    pub async fn run_path(&self, path: impl AsRef<Path>) -> Result<EvaluationOutcome> {
        self.run(dataset::open(path)?).await
    }

    /// Score a CSV table of precomputed (gold, predicted) rows
    pub fn score<R: Read>(&self, input: R) -> Result<EvaluationOutcome> {
        let records = dataset::read_prediction_records(input, &self.columns)?;
        info!("Loaded {} precomputed predictions", records.len());
        self.finish(None, records)
    }

    /// Score a CSV file of precomputed predictions
    pub fn score_path(&self, path: impl AsRef<Path>) -> Result<EvaluationOutcome> {
        self.score(dataset::open(path)?)
    }

    fn finish(
        &self,
        backend: Option<BackendKind>,
        records: Vec<PredictionRecord>,
    ) -> Result<EvaluationOutcome> {
        let universe = LabelUniverse::from_records(&records);
        let report = compute_metrics(&records, &universe)?;
        debug!(
            "Computed metrics over {} labels, accuracy {:.4}",
            universe.len(),
            report.accuracy
        );

        let text_report = self.writer.to_text(&report);
        let written = match &self.output_dir {
            Some(dir) => Some(self.writer.write_all(&report, dir)?),
            None => None,
        };

        Ok(EvaluationOutcome {
            backend,
            records,
            universe,
            report,
            text_report,
            written,
        })
    }
}

/// Predict every example in order; the first failure aborts
pub async fn predict_all(
    backend: &ResolvedBackend,
    examples: &[Example],
) -> Result<Vec<PredictionRecord>> {
    let start = Instant::now();
    let mut records = Vec::with_capacity(examples.len());

    for (i, example) in examples.iter().enumerate() {
        let predicted = backend.predict(&example.text).await?;
        debug!(
            "#{} gold={} predicted={} text={:?}",
            i, example.gold_intent, predicted, example.text
        );
        records.push(PredictionRecord::new(&example.gold_intent, &predicted));
    }

    info!(
        "Predicted {} examples with {} backend in {}ms",
        records.len(),
        backend.kind(),
        start.elapsed().as_millis()
    );
    Ok(records)
}
