//! Report rendering
//!
//! Every format is rendered directly from a [`ClassificationReport`]; no
//! format is derived from another one.

use crate::heatmap;
use crate::metrics::{Average, AverageMetrics, ClassificationReport, ConfusionMatrix};
use intentscope_core::{Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Structured report file name
pub const JSON_REPORT: &str = "classification_report.json";
/// Text report file name
pub const TEXT_REPORT: &str = "classification_report.txt";
/// Flat table report file name
pub const CSV_REPORT: &str = "classification_report.csv";
/// Confusion matrix table file name
pub const CONFUSION_CSV: &str = "confusion_matrix.csv";
/// Confusion matrix heat map file name
pub const CONFUSION_PNG: &str = "confusion_matrix.png";

const AGGREGATES: [Average; 3] = [Average::Micro, Average::Macro, Average::Weighted];
const HEADERS: [&str; 4] = ["precision", "recall", "f1-score", "support"];

/// Paths of the files written for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// `classification_report.json`
    pub json: PathBuf,
    /// `classification_report.txt`
    pub text: PathBuf,
    /// `classification_report.csv`
    pub csv: PathBuf,
    /// `confusion_matrix.csv`
    pub confusion_csv: PathBuf,
    /// `confusion_matrix.png`
    pub confusion_png: PathBuf,
}

impl ReportPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            json: dir.join(JSON_REPORT),
            text: dir.join(TEXT_REPORT),
            csv: dir.join(CSV_REPORT),
            confusion_csv: dir.join(CONFUSION_CSV),
            confusion_png: dir.join(CONFUSION_PNG),
        }
    }
}

/// Renders a [`ClassificationReport`] in every supported format
#[derive(Debug, Clone, Copy)]
pub struct ReportWriter {
    digits: usize,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self { digits: 2 }
    }
}

impl ReportWriter {
    /// Create a writer with the default two decimal digits
    pub fn new() -> Self {
        Self::default()
    }

    /// Decimal digits used by the text report
    pub fn with_digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    /// Structured document: label -> metric -> value, then aggregates
    pub fn to_json(&self, report: &ClassificationReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(&StructuredReport(report))?)
    }

    /// Aligned human-readable table
    pub fn to_text(&self, report: &ClassificationReport) -> String {
        let digits = self.digits;
        let width = report
            .universe()
            .iter()
            .map(str::len)
            .chain([Average::Weighted.name().len(), digits])
            .max()
            .unwrap_or(0);

        let mut out = format!("{:>width$} ", "");
        for header in HEADERS {
            let _ = write!(out, " {:>9}", header);
        }
        out.push_str("\n\n");

        for class in &report.classes {
            let _ = writeln!(
                out,
                "{:>width$}  {:>9.digits$} {:>9.digits$} {:>9.digits$} {:>9}",
                class.label, class.precision, class.recall, class.f1, class.support
            );
        }
        out.push('\n');

        let _ = writeln!(
            out,
            "{:>width$}  {:>9} {:>9} {:>9.digits$} {:>9}",
            "accuracy",
            "",
            "",
            report.accuracy,
            report.total()
        );
        for average in AGGREGATES {
            let row = report.average(average);
            let _ = writeln!(
                out,
                "{:>width$}  {:>9.digits$} {:>9.digits$} {:>9.digits$} {:>9}",
                average.name(),
                row.precision,
                row.recall,
                row.f1,
                row.support
            );
        }

        out
    }

    /// Flat row-per-label table at full precision
    pub fn to_csv(&self, report: &ClassificationReport) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(std::iter::once("").chain(HEADERS))?;

        for class in &report.classes {
            writer.write_record([
                class.label.clone(),
                class.precision.to_string(),
                class.recall.to_string(),
                class.f1.to_string(),
                class.support.to_string(),
            ])?;
        }

        writer.write_record([
            "accuracy".to_string(),
            String::new(),
            String::new(),
            report.accuracy.to_string(),
            report.total().to_string(),
        ])?;

        for average in AGGREGATES {
            let row = report.average(average);
            writer.write_record([
                average.name().to_string(),
                row.precision.to_string(),
                row.recall.to_string(),
                row.f1.to_string(),
                row.support.to_string(),
            ])?;
        }

        into_string(writer)
    }

    /// Confusion matrix as text, `true:<label>` rows by `pred:<label>` columns
    pub fn confusion_to_text(&self, matrix: &ConfusionMatrix) -> String {
        let rows: Vec<String> = matrix.universe().iter().map(|l| format!("true:{}", l)).collect();
        let cols: Vec<String> = matrix.universe().iter().map(|l| format!("pred:{}", l)).collect();
        let row_width = rows.iter().map(String::len).max().unwrap_or(0);

        let widths: Vec<usize> = cols
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let widest = (0..rows.len())
                    .map(|i| matrix.cell(i, j).to_string().len())
                    .max()
                    .unwrap_or(0);
                c.len().max(widest)
            })
            .collect();

        let mut out = format!("{:row_width$}", "");
        for (col, width) in cols.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", col, width = *width);
        }
        out.push('\n');

        for (i, row) in rows.iter().enumerate() {
            let _ = write!(out, "{:<row_width$}", row);
            for (j, width) in widths.iter().enumerate() {
                let _ = write!(out, "  {:>width$}", matrix.cell(i, j), width = *width);
            }
            out.push('\n');
        }

        out
    }

    /// Confusion matrix as CSV with the same row/column naming
    pub fn confusion_to_csv(&self, matrix: &ConfusionMatrix) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let header: Vec<String> = std::iter::once(String::new())
            .chain(matrix.universe().iter().map(|l| format!("pred:{}", l)))
            .collect();
        writer.write_record(&header)?;

        for (i, label) in matrix.universe().iter().enumerate() {
            let row: Vec<String> = std::iter::once(format!("true:{}", label))
                .chain(matrix.rows()[i].iter().map(u64::to_string))
                .collect();
            writer.write_record(&row)?;
        }

        into_string(writer)
    }

    /// Write every report into `dir`, creating it if absent
    pub fn write_all(&self, report: &ClassificationReport, dir: impl AsRef<Path>) -> Result<ReportPaths> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let paths = ReportPaths::in_dir(dir);

        std::fs::write(&paths.json, self.to_json(report)?)?;
        std::fs::write(&paths.text, self.to_text(report))?;
        std::fs::write(&paths.csv, self.to_csv(report)?)?;
        std::fs::write(&paths.confusion_csv, self.confusion_to_csv(&report.matrix)?)?;
        heatmap::save_heatmap(&report.matrix, &paths.confusion_png)?;

        info!("Reports written to {}", dir.display());
        Ok(paths)
    }
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::render(format!("failed to flush table: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::render(e.to_string()))
}

/// Serializes labels in universe order followed by the aggregate keys
struct StructuredReport<'a>(&'a ClassificationReport);

#[derive(Serialize)]
struct MetricRow {
    precision: f64,
    recall: f64,
    #[serde(rename = "f1-score")]
    f1: f64,
    support: u64,
}

impl From<&AverageMetrics> for MetricRow {
    fn from(avg: &AverageMetrics) -> Self {
        Self {
            precision: avg.precision,
            recall: avg.recall,
            f1: avg.f1,
            support: avg.support,
        }
    }
}

impl Serialize for StructuredReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let report = self.0;
        let mut map = serializer.serialize_map(Some(report.classes.len() + 1 + AGGREGATES.len()))?;

        for class in &report.classes {
            map.serialize_entry(
                &class.label,
                &MetricRow {
                    precision: class.precision,
                    recall: class.recall,
                    f1: class.f1,
                    support: class.support,
                },
            )?;
        }

        map.serialize_entry("accuracy", &report.accuracy)?;
        for average in AGGREGATES {
            map.serialize_entry(average.name(), &MetricRow::from(report.average(average)))?;
        }

        map.end()
    }
}
