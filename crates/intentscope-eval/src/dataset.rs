//! Labeled input tables
//!
//! Input is CSV with a header row. Only the named columns are read; any
//! other column is ignored. The header is validated before a single row is
//! consumed. Rows shorter than the header read their missing cells as
//! empty strings.

use csv::{ReaderBuilder, StringRecord};
use intentscope_core::{Error, Example, PredictionRecord, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default free-text column
pub const DEFAULT_TEXT_COLUMN: &str = "text";
/// Default gold label column
pub const DEFAULT_GOLD_COLUMN: &str = "gold_intent";
/// Default predicted label column (for scoring precomputed predictions)
pub const DEFAULT_PRED_COLUMN: &str = "pred_intent";

/// Names of the columns read from the input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Free-form query text
    #[serde(default = "default_text_column")]
    pub text: String,

    /// Gold intent label
    #[serde(default = "default_gold_column")]
    pub gold: String,

    /// Precomputed prediction
    #[serde(default = "default_pred_column")]
    pub predicted: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            text: default_text_column(),
            gold: default_gold_column(),
            predicted: default_pred_column(),
        }
    }
}

fn default_text_column() -> String {
    DEFAULT_TEXT_COLUMN.to_string()
}

fn default_gold_column() -> String {
    DEFAULT_GOLD_COLUMN.to_string()
}

fn default_pred_column() -> String {
    DEFAULT_PRED_COLUMN.to_string()
}

/// Read (text, gold) examples
pub fn read_examples<R: Read>(input: R, columns: &ColumnSpec) -> Result<Vec<Example>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let [text, gold] = locate(reader.headers()?, [&columns.text, &columns.gold])?;

    reader
        .records()
        .map(|row| {
            let row = row?;
            Ok(Example::new(field(&row, text), field(&row, gold)))
        })
        .collect()
}

/// Read (gold, predicted) pairs from a table of precomputed predictions
pub fn read_prediction_records<R: Read>(
    input: R,
    columns: &ColumnSpec,
) -> Result<Vec<PredictionRecord>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let [gold, predicted] = locate(reader.headers()?, [&columns.gold, &columns.predicted])?;

    reader
        .records()
        .map(|row| {
            let row = row?;
            Ok(PredictionRecord::new(field(&row, gold), field(&row, predicted)))
        })
        .collect()
}

/// Open a CSV file for reading
pub fn open(path: impl AsRef<Path>) -> Result<File> {
    Ok(File::open(path)?)
}

fn locate<const N: usize>(headers: &StringRecord, names: [&String; N]) -> Result<[usize; N]> {
    let mut positions = [0; N];
    let mut missing = Vec::new();

    for (slot, name) in positions.iter_mut().zip(names) {
        match headers.iter().position(|h| h.trim() == name.as_str()) {
            Some(i) => *slot = i,
            None => missing.push(name.as_str()),
        }
    }

    if !missing.is_empty() {
        let found: Vec<&str> = headers.iter().collect();
        return Err(Error::schema(format!(
            "input must provide columns {}; missing {} (found: {})",
            names
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(","),
            missing.join(","),
            found.join(",")
        )));
    }

    Ok(positions)
}

fn field(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}
