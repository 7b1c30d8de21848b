//! IntentScope CLI
//!
//! Classifies data-exploration queries into intents and evaluates the
//! classifier against a labeled CSV.

use anyhow::Result;
use clap::Parser;
use intentscope_classifiers::RuntimeResolver;
use intentscope_eval::{EvaluationDriver, EvaluationOutcome, ReportWriter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;

use cli::{Cli, Commands};
use config::EvalConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = EvalConfig::load(&cli.config)?;

    match cli.command {
        Commands::Evaluate {
            csv,
            report,
            backend,
            text_column,
            gold_column,
        } => {
            config.apply_report_args(&report);
            config.apply_backend_args(&backend);
            if let Some(column) = text_column {
                config.columns.text = column;
            }
            if let Some(column) = gold_column {
                config.columns.gold = column;
            }

            info!("Evaluating {}", csv.display());
            let outcome = driver(&config).run_path(&csv).await?;

            if let Some(kind) = outcome.backend {
                println!("[INFO] Prediction method: {}", kind);
            }
            print_outcome(&config, &outcome);
        }

        Commands::Score {
            csv,
            report,
            gold_column,
            pred_column,
        } => {
            config.apply_report_args(&report);
            if let Some(column) = gold_column {
                config.columns.gold = column;
            }
            if let Some(column) = pred_column {
                config.columns.predicted = column;
            }

            info!("Scoring {}", csv.display());
            let outcome = driver(&config).score_path(&csv)?;
            print_outcome(&config, &outcome);
        }

        Commands::Classify { text, backend } => {
            config.apply_backend_args(&backend);

            let resolved = RuntimeResolver::from_config(&config.backends).resolve()?;
            let label = resolved.predict(&text).await?;
            println!("{}\t{}", resolved.kind(), label);
        }
    }

    Ok(())
}

fn driver(config: &EvalConfig) -> EvaluationDriver {
    EvaluationDriver::new(RuntimeResolver::from_config(&config.backends))
        .with_columns(config.columns.clone())
        .with_writer(ReportWriter::new().with_digits(config.digits))
        .with_output_dir(&config.output_dir)
}

fn print_outcome(config: &EvalConfig, outcome: &EvaluationOutcome) {
    println!();
    println!("===== Classification report =====");
    println!("{}", outcome.text_report);

    let writer = ReportWriter::new().with_digits(config.digits);
    println!("===== Confusion matrix =====");
    println!("{}", writer.confusion_to_text(&outcome.report.matrix));

    if outcome.written.is_some() {
        println!("[OK] Reports saved to: {}", config.output_dir.display());
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "intentscope=debug,intentscope_classifiers=debug,intentscope_eval=debug"
    } else {
        "intentscope=info,intentscope_classifiers=info,intentscope_eval=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
