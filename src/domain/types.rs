//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built directly from CLI flags (`clap::ValueEnum` on the enums)
//! - used in-memory by the harmonization and regression code
//! - exported to JSON (model reports)

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default join key / time field name produced by every source adapter.
pub const DATETIME_KEY: &str = "Datetime";
/// Key name attached by daily aggregation.
pub const DATE_KEY: &str = "Date";
/// Default sub-hour bucket width (minutes).
pub const DEFAULT_INTERVAL_MINUTES: u32 = 10;
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
pub const DEFAULT_PREDICTION_PREFIX: &str = "predict_";

/// A timestamp key value.
///
/// Dates and date-times are kept as distinct variants: a `Date` never equals a
/// `DateTime`, so joining tables of mismatched granularity matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Stamp {
    pub fn date(self) -> NaiveDate {
        match self {
            Stamp::Date(d) => d,
            Stamp::DateTime(dt) => dt.date(),
        }
    }

    /// Date-time view; plain dates are taken at midnight.
    pub fn datetime(self) -> NaiveDateTime {
        match self {
            Stamp::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            Stamp::DateTime(dt) => dt,
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Stamp::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Bucket granularity for temporal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Calendar-date truncation.
    Daily,
    /// Floor to the nearest `minutes` mark within the hour.
    SubHour { minutes: u32 },
}

impl Cadence {
    /// Map a raw timestamp to its bucket key.
    pub fn bucket(self, stamp: Stamp) -> Stamp {
        match self {
            Cadence::Daily => Stamp::Date(stamp.date()),
            Cadence::SubHour { minutes } => {
                let dt = stamp.datetime();
                let minute = (dt.minute() / minutes) * minutes;
                // Hour and date are untouched, so this is always a valid time.
                let floored = dt
                    .date()
                    .and_hms_opt(dt.hour(), minute, 0)
                    .unwrap_or(dt);
                Stamp::DateTime(floored)
            }
        }
    }
}

/// How raw records of one source are grouped and which fields are averaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadencePolicy {
    pub cadence: Cadence,
    /// Time field read from the raw table.
    pub source_key: String,
    /// Key field attached to the aggregated table.
    pub output_key: String,
    /// Optional whitelist of fields to average (all numeric fields when `None`).
    pub columns: Option<Vec<String>>,
}

impl CadencePolicy {
    pub fn daily() -> Self {
        Self {
            cadence: Cadence::Daily,
            source_key: DATETIME_KEY.to_string(),
            output_key: DATE_KEY.to_string(),
            columns: None,
        }
    }

    pub fn sub_hour(minutes: u32) -> Result<Self, AppError> {
        if !(1..=60).contains(&minutes) {
            return Err(AppError::invalid(format!(
                "Sub-hour interval must be within 1..=60 minutes, got {minutes}"
            )));
        }
        Ok(Self {
            cadence: Cadence::SubHour { minutes },
            source_key: DATETIME_KEY.to_string(),
            output_key: DATETIME_KEY.to_string(),
            columns: None,
        })
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Default policy for a source, given the sub-hour interval to use for
    /// high-frequency sources.
    pub fn for_source(kind: SourceKind, interval_minutes: u32) -> Result<Self, AppError> {
        Ok(match kind {
            SourceKind::Rp5 => Self::daily().with_columns([
                "T", "P", "U", "Ff", "Tn", "Tx", "N", "Nh", "Cl", "Cm", "Ch",
            ]),
            SourceKind::Fluxnet | SourceKind::Mos => Self::daily(),
            SourceKind::Ampac => Self::sub_hour(interval_minutes)?,
        })
    }
}

/// Relational join mode for `merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    Inner,
    Outer,
    Left,
    Right,
}

impl FromStr for JoinHow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinHow::Inner),
            "outer" => Ok(JoinHow::Outer),
            "left" => Ok(JoinHow::Left),
            "right" => Ok(JoinHow::Right),
            other => Err(AppError::invalid(format!(
                "Unknown join mode '{other}' (expected inner, outer, left or right)"
            ))),
        }
    }
}

/// Concatenation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Stack rows (axis 0).
    Rows,
    /// Place columns side by side (axis 1).
    Columns,
}

/// Supported observation sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// rp5.ru synoptic station exports.
    Rp5,
    /// FLUXNET half-hourly flux tower files.
    Fluxnet,
    /// MOS model output (six 10-minute rows per hour).
    Mos,
    /// AMPAC automatic station logger exports.
    Ampac,
}

impl SourceKind {
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Rp5 => "rp5",
            SourceKind::Fluxnet => "fluxnet",
            SourceKind::Mos => "mos",
            SourceKind::Ampac => "ampac",
        }
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rp5" => Ok(SourceKind::Rp5),
            "fluxnet" => Ok(SourceKind::Fluxnet),
            "mos" => Ok(SourceKind::Mos),
            "ampac" => Ok(SourceKind::Ampac),
            _ => Err(AppError::unknown_source(s)),
        }
    }
}

/// A source file reference written as `SOURCE:PATH` on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub kind: SourceKind,
    pub path: PathBuf,
}

impl FromStr for SourceInput {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, path) = s
            .split_once(':')
            .ok_or_else(|| AppError::invalid(format!("Expected SOURCE:PATH, got '{s}'")))?;
        if path.is_empty() {
            return Err(AppError::invalid(format!("Missing path in '{s}'")));
        }
        Ok(Self {
            kind: kind.parse()?,
            path: PathBuf::from(path),
        })
    }
}

/// Parallel-indexed explanatory/response field names; pair `i` is `(x[i], y[i])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePairs {
    x: Vec<String>,
    y: Vec<String>,
}

impl VariablePairs {
    pub fn new<S: Into<String>>(x: Vec<S>, y: Vec<S>) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::invalid(format!(
                "Explanatory and response lists differ in length ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            x: x.into_iter().map(Into::into).collect(),
            y: y.into_iter().map(Into::into).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.x.iter().map(String::as_str).zip(self.y.iter().map(String::as_str))
    }
}

/// Identifier of a pair in the model report.
pub fn pair_key(x: &str, y: &str) -> String {
    format!("{x}-{y}")
}

/// Settings for the significance-gated prediction step.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    pub significance: f64,
    pub prediction_prefix: String,
    /// Estimate a free intercept. Off by default: relationships are expected
    /// to pass through the origin unless a caller opts in.
    pub fit_intercept: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            prediction_prefix: DEFAULT_PREDICTION_PREFIX.to_string(),
            fit_intercept: false,
        }
    }
}

/// Summary of one fitted pair, as reported to the caller.
///
/// Undefined statistics are `NaN` in memory and `null` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub coefficient: f64,
    pub intercept: f64,
    #[serde(rename = "R_square")]
    pub r_square: f64,
    #[serde(rename = "p-value")]
    pub p_value: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub n_obs: usize,
    /// Whether the pair passed the significance gate and produced a column.
    pub significant: bool,
}

/// Pair identifier (`"x-y"`) to model summary.
pub type ModelReport = BTreeMap<String, ModelSummary>;

/// A full `meteo predict` run as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train: Vec<SourceInput>,
    /// Train sources that are aggregated with their default cadence before merging.
    pub average: Vec<SourceKind>,
    pub score: SourceInput,
    pub pairs: VariablePairs,
    pub how: JoinHow,
    pub on: String,
    pub interval_minutes: u32,
    pub prediction: PredictionConfig,
    pub export_table: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn dt(h: u32, m: u32, s: u32) -> Stamp {
        Stamp::DateTime(
            NaiveDate::from_ymd_opt(2020, 6, 1)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    #[test]
    fn sub_hour_bucket_floors_minutes() {
        let cadence = Cadence::SubHour { minutes: 10 };
        assert_eq!(cadence.bucket(dt(13, 47, 31)), dt(13, 40, 0));
        assert_eq!(cadence.bucket(dt(13, 40, 0)), dt(13, 40, 0));
        assert_eq!(cadence.bucket(dt(0, 9, 59)), dt(0, 0, 0));
    }

    #[test]
    fn daily_bucket_truncates_to_date() {
        let stamp = Cadence::Daily.bucket(dt(23, 59, 0));
        assert_eq!(stamp, Stamp::Date(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()));
        assert_eq!(Cadence::Daily.bucket(stamp), stamp);
    }

    #[test]
    fn date_and_datetime_stamps_never_match() {
        let d = Stamp::Date(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_ne!(d, dt(0, 0, 0));
    }

    #[test]
    fn sub_hour_interval_is_validated() {
        assert!(CadencePolicy::sub_hour(0).is_err());
        assert!(CadencePolicy::sub_hour(61).is_err());
        assert!(CadencePolicy::sub_hour(15).is_ok());
    }

    #[test]
    fn source_defaults_pick_cadence_and_fields() {
        let rp5 = CadencePolicy::for_source(SourceKind::Rp5, 10).unwrap();
        assert_eq!(rp5.cadence, Cadence::Daily);
        assert_eq!(rp5.output_key, DATE_KEY);
        assert!(rp5.columns.as_ref().unwrap().iter().any(|c| c == "Nh"));

        let mos = CadencePolicy::for_source(SourceKind::Mos, 10).unwrap();
        assert_eq!(mos.columns, None);

        let ampac = CadencePolicy::for_source(SourceKind::Ampac, 30).unwrap();
        assert_eq!(ampac.cadence, Cadence::SubHour { minutes: 30 });
        assert_eq!(ampac.output_key, DATETIME_KEY);
        assert!(CadencePolicy::for_source(SourceKind::Ampac, 0).is_err());
    }

    #[test]
    fn source_kind_rejects_unknown_names() {
        assert_eq!("RP5".parse::<SourceKind>().unwrap(), SourceKind::Rp5);
        let err = "gfs".parse::<SourceKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSourceFormat);
    }

    #[test]
    fn source_input_parses_kind_and_path() {
        let input: SourceInput = "ampac:data/ampac.csv".parse().unwrap();
        assert_eq!(input.kind, SourceKind::Ampac);
        assert_eq!(input.path, PathBuf::from("data/ampac.csv"));
        assert!("ampac".parse::<SourceInput>().is_err());
    }

    #[test]
    fn variable_pairs_require_equal_lengths() {
        assert!(VariablePairs::new(vec!["T", "Ff"], vec!["t_air"]).is_err());
        let pairs = VariablePairs::new(vec!["T", "Ff"], vec!["t_air", "wind_speed"]).unwrap();
        let collected: Vec<_> = pairs.iter().collect();
        assert_eq!(collected, vec![("T", "t_air"), ("Ff", "wind_speed")]);
    }

    #[test]
    fn join_mode_parses_case_insensitively() {
        assert_eq!("Outer".parse::<JoinHow>().unwrap(), JoinHow::Outer);
        assert!("cross".parse::<JoinHow>().is_err());
    }
}
