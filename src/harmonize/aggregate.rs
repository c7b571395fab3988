//! Temporal aggregation of raw per-source records onto a bucket grid.
//!
//! Every record is mapped to a bucket key by the policy's cadence (calendar
//! date, or a floored sub-hour mark). Records sharing a key collapse into one
//! row holding the mean of each numeric field, skipping missing values. A
//! field's mean is missing only when every contributing value is missing.
//!
//! Text fields are never averaged; they are dropped from the output.

use std::collections::BTreeMap;

use crate::domain::{CadencePolicy, Stamp};
use crate::error::AppError;
use crate::table::{Column, TimeSeriesTable};

/// Aggregate `table` into one row per bucket. The input is left untouched.
///
/// The output starts with the bucket key field (`policy.output_key`), followed
/// by the averaged fields in their original order. Rows are sorted by key.
pub fn aggregate(table: &TimeSeriesTable, policy: &CadencePolicy) -> Result<TimeSeriesTable, AppError> {
    if table.is_empty() {
        return empty_output(table, policy);
    }

    let time_key = resolve_time_key(table, policy)?;
    let stamps = table.time(time_key)?;
    let fields = select_fields(table, policy, time_key)?;
    if fields.is_empty() {
        return Err(AppError::schema(format!(
            "{} table has no numeric fields to aggregate",
            table.label()
        )));
    }

    let mut groups: BTreeMap<Stamp, Vec<usize>> = BTreeMap::new();
    for (row, stamp) in stamps.iter().enumerate() {
        // Records without a timestamp cannot be bucketed.
        if let Some(stamp) = stamp {
            groups.entry(policy.cadence.bucket(*stamp)).or_default().push(row);
        }
    }

    let mut columns = Vec::with_capacity(fields.len() + 1);
    columns.push(Column::time(
        policy.output_key.clone(),
        groups.keys().copied().map(Some).collect(),
    ));
    for (name, values) in fields {
        let means = groups.values().map(|rows| nan_mean(values, rows)).collect();
        columns.push(Column::numeric(name, means));
    }

    log::debug!(
        "aggregated {} table: {} rows -> {} buckets ({:?})",
        table.label(),
        table.n_rows(),
        groups.len(),
        policy.cadence
    );

    TimeSeriesTable::from_columns(table.label(), columns)
}

/// The raw time field, or the output key for tables that were already aggregated.
fn resolve_time_key<'a>(table: &TimeSeriesTable, policy: &'a CadencePolicy) -> Result<&'a str, AppError> {
    if table.has_column(&policy.source_key) {
        Ok(&policy.source_key)
    } else if table.has_column(&policy.output_key) {
        Ok(&policy.output_key)
    } else {
        Err(AppError::missing_field(&policy.source_key, table.label()))
    }
}

/// Numeric fields to average, honoring the policy's whitelist.
fn select_fields<'t>(
    table: &'t TimeSeriesTable,
    policy: &CadencePolicy,
    time_key: &str,
) -> Result<Vec<(String, &'t [f64])>, AppError> {
    let is_key = |name: &str| name == time_key || name == policy.output_key;

    let candidates: Vec<&Column> = match &policy.columns {
        Some(names) => names
            .iter()
            .map(|name| table.require(name))
            .collect::<Result<_, _>>()?,
        None => table.columns().iter().collect(),
    };

    let mut fields = Vec::with_capacity(candidates.len());
    for column in candidates {
        if is_key(&column.name) {
            continue;
        }
        match column.as_numeric() {
            Some(values) => fields.push((column.name.clone(), values)),
            None => log::debug!(
                "skipping non-numeric field `{}` in {} table",
                column.name,
                table.label()
            ),
        }
    }
    Ok(fields)
}

fn empty_output(table: &TimeSeriesTable, policy: &CadencePolicy) -> Result<TimeSeriesTable, AppError> {
    let mut columns = vec![Column::time(policy.output_key.clone(), Vec::new())];
    for column in table.columns() {
        let wanted = policy
            .columns
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| *n == column.name));
        if wanted
            && column.as_numeric().is_some()
            && column.name != policy.source_key
            && column.name != policy.output_key
        {
            columns.push(Column::numeric(column.name.clone(), Vec::new()));
        }
    }
    TimeSeriesTable::from_columns(table.label(), columns)
}

fn nan_mean(values: &[f64], rows: &[usize]) -> f64 {
    let (sum, count) = rows
        .iter()
        .map(|&i| values[i])
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}
