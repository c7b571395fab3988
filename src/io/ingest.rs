//! CSV ingest shared by the source adapters.
//!
//! This module turns delimited text into a `TimeSeriesTable`:
//!
//! - preamble skipping and delimiter/quote handling (`CsvLayout`)
//! - locale-aware number parsing with missing-value sentinels
//! - per-column type inference (numeric when every present value parses)
//! - timestamp parsing against a small set of formats
//!
//! Source-specific conventions live in `io::sources`.

use std::borrow::Cow;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{DATETIME_KEY, SourceKind, Stamp};
use crate::error::AppError;
use crate::io::sources;
use crate::table::{Column, TimeSeriesTable};

/// Read a source file and convert it with the matching adapter.
pub fn read_source(path: &Path, kind: SourceKind) -> Result<TimeSeriesTable, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to open '{}': {e}", path.display())))?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        log::warn!(
            "{} source '{}' is not valid UTF-8; invalid bytes were replaced",
            kind.name(),
            path.display()
        );
    }
    let table = parse_source(&text, kind)?;
    log::info!(
        "read {} source '{}': {} rows, {} fields",
        kind.name(),
        path.display(),
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Convert already-loaded text with the adapter for `kind`.
pub fn parse_source(text: &str, kind: SourceKind) -> Result<TimeSeriesTable, AppError> {
    match kind {
        SourceKind::Rp5 => sources::rp5(text),
        SourceKind::Fluxnet => sources::fluxnet(text),
        SourceKind::Mos => sources::mos(text),
        SourceKind::Ampac => sources::ampac(text),
    }
}

/// Delimited-text conventions of one source.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub delimiter: u8,
    /// Lines dropped before the header (or first record).
    pub skip_lines: usize,
    pub has_header: bool,
    pub number: NumberFormat,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormat {
    /// `,` is the decimal separator.
    pub decimal_comma: bool,
    /// Sentinel value meaning "missing".
    pub missing_sentinel: Option<f64>,
}

/// Header names (empty when the layout has none) and trimmed records.
#[derive(Debug, Clone)]
pub struct RawRecords {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

pub fn read_records(text: &str, layout: &CsvLayout) -> Result<RawRecords, AppError> {
    let body: String = text
        .lines()
        .skip(layout.skip_lines)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(layout.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = if layout.has_header {
        reader
            .headers()
            .map_err(|e| AppError::parse(format!("Failed to read CSV headers: {e}")))?
            .iter()
            .map(normalize_header_name)
            .collect()
    } else {
        Vec::new()
    };

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::parse(format!(
                "CSV parse error at line {}: {e}",
                idx + layout.skip_lines + 1 + usize::from(layout.has_header)
            ))
        })?;
        // Blank lines come through as a single empty field.
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(record);
    }

    Ok(RawRecords { headers, records })
}

fn normalize_header_name(name: &str) -> String {
    // Exports edited in spreadsheet tools often carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Raw cell text at `idx`, `None` when absent or empty.
pub fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a number; sentinels and unparseable text are `None`.
pub fn parse_number(s: &str, format: NumberFormat) -> Option<f64> {
    let s = s.trim();
    let v = if format.decimal_comma {
        s.replace(',', ".").parse::<f64>().ok()?
    } else {
        s.parse::<f64>().ok()?
    };
    if !v.is_finite() || format.missing_sentinel == Some(v) {
        return None;
    }
    Some(v)
}

/// Build a column, numeric when every present value parses as a number.
pub fn infer_column(name: &str, values: Vec<Option<String>>, format: NumberFormat) -> Column {
    let is_numeric = values.iter().flatten().all(|v| {
        let v = v.trim();
        parse_number(v, format).is_some() || is_sentinel(v, format)
    });
    if is_numeric {
        let numbers = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| parse_number(s, format)).unwrap_or(f64::NAN))
            .collect();
        Column::numeric(name, numbers)
    } else {
        Column::text(name, values)
    }
}

fn is_sentinel(s: &str, format: NumberFormat) -> bool {
    let Some(sentinel) = format.missing_sentinel else {
        return false;
    };
    let parsed = if format.decimal_comma {
        s.replace(',', ".").parse::<f64>()
    } else {
        s.parse::<f64>()
    };
    parsed.is_ok_and(|v| v == sentinel)
}

/// Parse a timestamp with the first matching format. Date-only formats are
/// taken at midnight.
pub fn parse_timestamp(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(chrono::NaiveTime::MIN));
        }
    }
    None
}

/// Assemble an adapter's output: a `Datetime` field first, then `fields`,
/// sorted by time. Rows whose timestamp could not be read are dropped.
pub fn build_table(
    label: &str,
    stamps: Vec<Option<NaiveDateTime>>,
    fields: Vec<Column>,
) -> Result<TimeSeriesTable, AppError> {
    let unreadable = stamps.iter().filter(|s| s.is_none()).count();
    let keep: Vec<Option<usize>> = stamps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_some())
        .map(|(i, _)| Some(i))
        .collect();
    if unreadable > 0 {
        log::warn!("{label}: skipped {unreadable} rows with unreadable timestamps");
    }

    let mut columns = Vec::with_capacity(fields.len() + 1);
    columns.push(Column::time(
        DATETIME_KEY,
        stamps.into_iter().map(|s| s.map(Stamp::DateTime)).collect(),
    ));
    columns.extend(fields.into_iter().filter(|c| c.name != DATETIME_KEY));

    let table = TimeSeriesTable::from_columns(label, columns)?;
    table.take_rows(&keep).sorted_by_time(DATETIME_KEY)
}
