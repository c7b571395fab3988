//! Command-line parsing for the `meteo` harmonization tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! harmonization and regression code. Flags are converted into plain config
//! structs in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    DATETIME_KEY, DEFAULT_INTERVAL_MINUTES, DEFAULT_PREDICTION_PREFIX, DEFAULT_SIGNIFICANCE, JoinHow, SourceInput,
    SourceKind,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Meteorological source harmonization and cross-source regression")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge training sources, fit each x -> y pair, and predict the significant ones.
    Predict(PredictArgs),
    /// Read one source, aggregate it with its default cadence, and summarize it.
    Aggregate(AggregateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Training source as SOURCE:PATH (repeatable; merged left to right).
    #[arg(long = "train", value_name = "SOURCE:PATH", required = true)]
    pub train: Vec<SourceInput>,

    /// Aggregate training sources of this kind before merging (repeatable).
    #[arg(long = "average", value_enum)]
    pub average: Vec<SourceKind>,

    /// Full-resolution source that receives predictions, as SOURCE:PATH.
    #[arg(long, value_name = "SOURCE:PATH")]
    pub score: SourceInput,

    /// Explanatory field (repeatable; paired by position with -y).
    #[arg(short = 'x', required = true)]
    pub x: Vec<String>,

    /// Response field (repeatable; paired by position with -x).
    #[arg(short = 'y', required = true)]
    pub y: Vec<String>,

    /// Join mode used when merging training sources.
    #[arg(long, value_enum, default_value_t = JoinHow::Inner)]
    pub how: JoinHow,

    /// Join key field.
    #[arg(long, default_value = DATETIME_KEY)]
    pub on: String,

    /// Bucket width (minutes) for sub-hour sources.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
    pub interval: u32,

    /// p-value threshold below which a pair produces predictions.
    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE)]
    pub significance: f64,

    /// Prefix of prediction field names.
    #[arg(long, default_value = DEFAULT_PREDICTION_PREFIX)]
    pub prefix: String,

    /// Estimate a free intercept instead of fitting through the origin.
    #[arg(long)]
    pub fit_intercept: bool,

    /// Export the augmented scoring table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the model report to JSON.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct AggregateArgs {
    /// Source as SOURCE:PATH.
    #[arg(long, value_name = "SOURCE:PATH")]
    pub source: SourceInput,

    /// Bucket width (minutes) for sub-hour sources.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
    pub interval: u32,

    /// Export the aggregated table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_args_parse_with_defaults() {
        let cli = Cli::try_parse_from([
            "meteo", "predict", "--train", "rp5:rp5.csv", "--train", "ampac:ampac.csv", "--average", "ampac",
            "--score", "rp5:rp5.csv", "-x", "T", "-y", "t_air", "-x", "Ff", "-y", "wind_speed",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.train.len(), 2);
        assert_eq!(args.average, vec![SourceKind::Ampac]);
        assert_eq!(args.x, vec!["T", "Ff"]);
        assert_eq!(args.how, JoinHow::Inner);
        assert_eq!(args.on, "Datetime");
        assert_eq!(args.significance, 0.05);
        assert_eq!(args.prefix, "predict_");
        assert!(!args.fit_intercept);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = Cli::try_parse_from(["meteo", "aggregate", "--source", "gfs:file.csv"]).unwrap_err();
        assert!(err.to_string().contains("gfs"));
    }
}
