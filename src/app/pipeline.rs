//! The harmonize-then-predict workflow, kept apart from printing.
//!
//! read sources -> aggregate (optional, per source) -> merge -> fit pairs -> predict

use crate::domain::{CadencePolicy, ModelReport, RunConfig, SourceInput};
use crate::error::AppError;
use crate::fit::predict_significant;
use crate::harmonize::{aggregate, merge};
use crate::io::read_source;
use crate::table::TimeSeriesTable;

/// All computed outputs of a single `meteo predict` run.
#[derive(Debug, Clone)]
pub struct PredictOutput {
    /// Training table after aggregation and merging.
    pub merged: TimeSeriesTable,
    /// Scoring table with prediction fields appended.
    pub scored: TimeSeriesTable,
    pub report: ModelReport,
}

#[derive(Debug, Clone)]
pub struct AggregateOutput {
    pub raw: TimeSeriesTable,
    pub aggregated: TimeSeriesTable,
}

/// Execute the full predict workflow.
pub fn run_predict(config: &RunConfig) -> Result<PredictOutput, AppError> {
    if config.train.is_empty() {
        return Err(AppError::invalid("At least one training source is required"));
    }

    let mut train = Vec::with_capacity(config.train.len());
    for input in &config.train {
        let table = read_source(&input.path, input.kind)?;
        let table = if config.average.contains(&input.kind) {
            let policy = CadencePolicy::for_source(input.kind, config.interval_minutes)?;
            aggregate(&table, &policy)?
        } else {
            table
        };
        train.push(table);
    }

    let merged = merge(&train, config.how, &config.on)?;
    log::info!(
        "merged {} training tables ({:?} on `{}`): {} rows",
        train.len(),
        config.how,
        config.on,
        merged.n_rows()
    );

    let score = read_source(&config.score.path, config.score.kind)?;
    let (scored, report) = predict_significant(&merged, &score, &config.pairs, &config.prediction)?;

    Ok(PredictOutput {
        merged,
        scored,
        report,
    })
}

/// Read one source and aggregate it with that source's default cadence.
pub fn run_aggregate(input: &SourceInput, interval_minutes: u32) -> Result<AggregateOutput, AppError> {
    let raw = read_source(&input.path, input.kind)?;
    let policy = CadencePolicy::for_source(input.kind, interval_minutes)?;
    let aggregated = aggregate(&raw, &policy)?;
    log::info!(
        "aggregated {} source: {} -> {} rows",
        input.kind.name(),
        raw.n_rows(),
        aggregated.n_rows()
    );
    Ok(AggregateOutput { raw, aggregated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JoinHow, PredictionConfig, SourceKind, VariablePairs};
    use crate::error::ErrorKind;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const T_A: [f64; 6] = [15.5, 16.5, 17.5, 18.5, 19.5, 20.5];

    fn write_fixture(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn mos_text() -> String {
        let mut text = String::from("MOS forecast\n");
        for t in T_A {
            text.push_str(&format!("01.06.2020;3;10;{t};60;1;2;0;3;0\n"));
        }
        text
    }

    /// Two logger readings per 10-minute bucket, straddling twice the MOS value.
    fn ampac_text() -> String {
        let mut text = String::from("date;t_air\n");
        for (i, t) in T_A.iter().enumerate() {
            let m = i * 10;
            let lo = format!("{}", 2.0 * t - 0.25).replace('.', ",");
            let hi = format!("{}", 2.0 * t + 0.25).replace('.', ",");
            text.push_str(&format!("2020-06-01 03:{:02}:00;{lo}\n", m + 2));
            text.push_str(&format!("2020-06-01 03:{:02}:00;{hi}\n", m + 7));
        }
        text
    }

    fn config(mos: &Path, ampac: &Path) -> RunConfig {
        RunConfig {
            train: vec![
                SourceInput {
                    kind: SourceKind::Ampac,
                    path: ampac.to_path_buf(),
                },
                SourceInput {
                    kind: SourceKind::Mos,
                    path: mos.to_path_buf(),
                },
            ],
            average: vec![SourceKind::Ampac],
            score: SourceInput {
                kind: SourceKind::Mos,
                path: mos.to_path_buf(),
            },
            pairs: VariablePairs::new(vec!["T_a"], vec!["t_air"]).unwrap(),
            how: JoinHow::Inner,
            on: "Datetime".to_string(),
            interval_minutes: 10,
            prediction: PredictionConfig::default(),
            export_table: None,
            export_report: None,
        }
    }

    #[test]
    fn predict_aggregates_merges_and_scores() {
        let dir = tempfile::tempdir().unwrap();
        let mos = write_fixture(&dir, "mos.csv", &mos_text());
        let ampac = write_fixture(&dir, "ampac.csv", &ampac_text());
        let run = run_predict(&config(&mos, &ampac)).unwrap();

        assert_eq!(run.merged.n_rows(), 6);
        let summary = &run.report["T_a-t_air"];
        assert!(summary.significant);
        assert!((summary.coefficient - 2.0).abs() < 1e-9);
        assert_eq!(summary.intercept, 0.0);

        let predicted = run.scored.numeric("predict_t_air").unwrap();
        for (p, t) in predicted.iter().zip(T_A) {
            assert!((p - 2.0 * t).abs() < 1e-6);
        }
        assert!(run.scored.has_column("T_soil"), "score fields are kept");
    }

    #[test]
    fn predict_requires_a_training_source() {
        let path = Path::new("unused.csv");
        let mut cfg = config(path, path);
        cfg.train.clear();
        let err = run_predict(&cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn aggregate_uses_the_source_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let ampac = write_fixture(&dir, "ampac.csv", &ampac_text());
        let run = run_aggregate(
            &SourceInput {
                kind: SourceKind::Ampac,
                path: ampac,
            },
            30,
        )
        .unwrap();

        assert_eq!(run.raw.n_rows(), 12);
        assert_eq!(run.aggregated.n_rows(), 2);
        let t_air = run.aggregated.numeric("t_air").unwrap();
        assert!((t_air[0] - 2.0 * 16.5).abs() < 1e-9);
        assert!((t_air[1] - 2.0 * 19.5).abs() < 1e-9);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = run_aggregate(
            &SourceInput {
                kind: SourceKind::Rp5,
                path: PathBuf::from("/nonexistent/meteo/rp5.csv"),
            },
            10,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
