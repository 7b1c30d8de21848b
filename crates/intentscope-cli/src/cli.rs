use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "intentscope")]
#[command(
    author,
    version,
    about = "Intent classification and precision/recall/F1 evaluation"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "intentscope.yaml", env = "INTENTSCOPE_CONFIG")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Predict every example of a labeled CSV and report precision/recall/F1
    Evaluate {
        /// CSV with text and gold intent columns
        #[arg(long)]
        csv: PathBuf,

        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        backend: BackendArgs,

        /// Free-text column name
        #[arg(long)]
        text_column: Option<String>,

        /// Gold intent column name
        #[arg(long)]
        gold_column: Option<String>,
    },

    /// Score a CSV of precomputed predictions (gold and predicted columns)
    Score {
        /// CSV with gold and predicted intent columns
        #[arg(long)]
        csv: PathBuf,

        #[command(flatten)]
        report: ReportArgs,

        /// Gold intent column name
        #[arg(long)]
        gold_column: Option<String>,

        /// Predicted intent column name
        #[arg(long)]
        pred_column: Option<String>,
    },

    /// Classify a single query with the resolved backend
    Classify {
        /// Query text
        text: String,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

/// Report output options
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Output directory (created if absent)
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Decimal digits in the text report
    #[arg(long)]
    pub digits: Option<usize>,
}

/// Backend overrides
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Hosted platform prediction endpoint
    #[arg(long, env = "INTENTSCOPE_EXTERNAL_URL")]
    pub external_url: Option<String>,

    /// Persisted classifier artifact (JSON)
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// YAML pattern table for the rules backend
    #[arg(long)]
    pub patterns: Option<PathBuf>,
}
