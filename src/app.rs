//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - reads, aggregates and merges the training sources
//! - fits every variable pair and predicts the significant ones
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{AggregateArgs, Command, PredictArgs};
use crate::domain::{PredictionConfig, RunConfig, VariablePairs};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `meteo` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Aggregate(args) => handle_aggregate(args),
    }
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_predict(&config)?;

    println!("{}", crate::report::format_table_summary(&run.merged));
    println!("{}", crate::report::format_model_report(&run.report, &config.prediction));

    if let Some(path) = &config.export_table {
        crate::io::write_table_csv(path, &run.scored)?;
        log::info!("wrote scored table to '{}'", path.display());
    }
    if let Some(path) = &config.export_report {
        crate::io::write_report_json(path, &run.report)?;
        log::info!("wrote model report to '{}'", path.display());
    }

    Ok(())
}

fn handle_aggregate(args: AggregateArgs) -> Result<(), AppError> {
    let run = pipeline::run_aggregate(&args.source, args.interval)?;

    println!("{}", crate::report::format_table_summary(&run.aggregated));

    if let Some(path) = &args.export {
        crate::io::write_table_csv(path, &run.aggregated)?;
        log::info!("wrote aggregated table to '{}'", path.display());
    }

    Ok(())
}

pub fn run_config_from_args(args: &PredictArgs) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        train: args.train.clone(),
        average: args.average.clone(),
        score: args.score.clone(),
        pairs: VariablePairs::new(args.x.clone(), args.y.clone())?,
        how: args.how,
        on: args.on.clone(),
        interval_minutes: args.interval,
        prediction: PredictionConfig {
            significance: args.significance,
            prediction_prefix: args.prefix.clone(),
            fit_intercept: args.fit_intercept,
        },
        export_table: args.export.clone(),
        export_report: args.report.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::error::ErrorKind;

    fn predict_args(argv: &[&str]) -> PredictArgs {
        let mut full = vec!["meteo", "predict"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Predict(args) => args,
            Command::Aggregate(_) => panic!("expected predict"),
        }
    }

    #[test]
    fn config_carries_prediction_settings() {
        let args = predict_args(&[
            "--train", "mos:m.csv", "--score", "mos:m.csv", "-x", "T_a", "-y", "t_air", "--fit-intercept",
            "--prefix", "est_", "--significance", "0.01",
        ]);
        let config = run_config_from_args(&args).unwrap();
        assert_eq!(config.pairs.len(), 1);
        assert!(config.prediction.fit_intercept);
        assert_eq!(config.prediction.prediction_prefix, "est_");
        assert_eq!(config.prediction.significance, 0.01);
        assert_eq!(config.interval_minutes, 10);
    }

    #[test]
    fn unequal_pair_lists_are_rejected() {
        let args = predict_args(&["--train", "mos:m.csv", "--score", "mos:m.csv", "-x", "T_a", "-x", "RH", "-y", "t_air"]);
        let err = run_config_from_args(&args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
