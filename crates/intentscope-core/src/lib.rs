//! IntentScope Core
//!
//! Types and error handling shared by the intent classifiers and the
//! evaluation harness.
//!
//! This crate provides:
//! - The error taxonomy (`Error`, `Result`)
//! - Labeled examples and prediction records
//! - The sorted label universe used to order every report

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{normalize_label, Example, LabelUniverse, PredictionRecord, UNKNOWN_INTENT};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Example, LabelUniverse, PredictionRecord, UNKNOWN_INTENT};
}
