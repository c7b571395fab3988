//! Source adapters: one function per supported export format.
//!
//! Each adapter returns a table with a `Datetime` timestamp field (sorted)
//! plus the source's own fields, numeric where the data allows.

use chrono::{Duration, NaiveDateTime};

use crate::error::AppError;
use crate::io::codes::{RP5_NUMERIC_CODE_FIELDS, translate_code};
use crate::io::ingest::{
    CsvLayout, NumberFormat, RawRecords, build_table, cell, infer_column, parse_number, parse_timestamp,
    read_records,
};
use crate::table::{Column, TimeSeriesTable};

/// Minute offsets of the six consecutive rows that make up one MOS hour.
const MOS_MINUTES: [i64; 6] = [0, 10, 20, 30, 40, 50];

/// Largest accepted `Time` value (hours after `Initial_Date`).
const MOS_MAX_HOURS: f64 = 24.0;

const MOS_FIELDS: [&str; 10] = [
    "Initial_Date", "Time", "T_soil", "T_a", "RH", "FAR", "Rn", "PP", "Wind", "Uv",
];

/// rp5.ru station archive.
///
/// Six preamble lines, then a header. The first field of every record is the
/// local observation time (day first); the remaining fields are named by the
/// header, whose first name only describes the time field.
pub fn rp5(text: &str) -> Result<TimeSeriesTable, AppError> {
    let layout = CsvLayout {
        delimiter: b';',
        skip_lines: 6,
        has_header: true,
        number: NumberFormat::default(),
    };
    let raw = read_records(text, &layout)?;

    let stamps = raw
        .records
        .iter()
        .map(|r| cell(r, 0).and_then(|s| parse_timestamp(s, &["%d.%m.%Y %H:%M"], &["%d.%m.%Y"])))
        .collect();

    let mut fields = Vec::new();
    for (idx, name) in raw.headers.iter().enumerate().skip(1) {
        // Trailing separators produce unnamed, empty columns.
        if name.is_empty() {
            continue;
        }
        let values = column_values(&raw, idx);
        if RP5_NUMERIC_CODE_FIELDS.contains(&name.as_str()) {
            let numbers = values
                .iter()
                .map(|v| v.as_deref().and_then(translate_code).unwrap_or(f64::NAN))
                .collect();
            fields.push(Column::numeric(name.as_str(), numbers));
        } else {
            fields.push(infer_column(name, values, layout.number));
        }
    }

    build_table("rp5", stamps, fields)
}

/// FLUXNET half-hourly product. `-9999` marks missing values; the time key
/// comes from `TIMESTAMP_START` (`YYYYMMDDHHMM`).
pub fn fluxnet(text: &str) -> Result<TimeSeriesTable, AppError> {
    let layout = CsvLayout {
        delimiter: b',',
        skip_lines: 0,
        has_header: true,
        number: NumberFormat {
            decimal_comma: false,
            missing_sentinel: Some(-9999.0),
        },
    };
    let raw = read_records(text, &layout)?;
    let ts_idx = header_index(&raw, "TIMESTAMP_START", "fluxnet")?;

    let stamps = raw
        .records
        .iter()
        .map(|r| cell(r, ts_idx).and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M").ok()))
        .collect();

    let fields = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(idx, name)| {
            let values = column_values(&raw, idx);
            // Timestamp fields stay textual so they are never averaged.
            if name.starts_with("TIMESTAMP") {
                Column::text(name.as_str(), values)
            } else {
                infer_column(name, values, layout.number)
            }
        })
        .collect();

    build_table("fluxnet", stamps, fields)
}

/// MOS model output: one preamble line, no header, fixed field order.
///
/// `Datetime = Initial_Date + Time hours + minute offset`, where the minute
/// offset cycles through 0, 10, ..., 50 over consecutive rows.
pub fn mos(text: &str) -> Result<TimeSeriesTable, AppError> {
    let layout = CsvLayout {
        delimiter: b';',
        skip_lines: 1,
        has_header: false,
        number: NumberFormat::default(),
    };
    let raw = read_records(text, &layout)?;
    if let Some(record) = raw.records.iter().find(|r| r.len() < MOS_FIELDS.len()) {
        return Err(AppError::parse(format!(
            "mos record has {} fields, expected {}",
            record.len(),
            MOS_FIELDS.len()
        )));
    }

    let stamps = raw
        .records
        .iter()
        .enumerate()
        .map(|(row, r)| {
            let date = parse_timestamp(cell(r, 0)?, &[], &["%d.%m.%Y", "%d/%m/%Y", "%Y-%m-%d"])?;
            let hours = parse_number(cell(r, 1)?, layout.number)?;
            // Hours outside one forecast day make the row unreadable.
            if !(0.0..=MOS_MAX_HOURS).contains(&hours) {
                return None;
            }
            let minutes = (hours * 60.0).round() as i64 + MOS_MINUTES[row % MOS_MINUTES.len()];
            date.checked_add_signed(Duration::try_minutes(minutes)?)
        })
        .collect();

    let fields = MOS_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let values = column_values(&raw, idx);
            if idx == 0 {
                Column::text(*name, values)
            } else {
                infer_column(name, values, layout.number)
            }
        })
        .collect();

    build_table("mos", stamps, fields)
}

/// AMPAC logger export: `;`-separated, decimal comma, `9999` for missing.
/// The `date` field becomes `Datetime`.
pub fn ampac(text: &str) -> Result<TimeSeriesTable, AppError> {
    let layout = CsvLayout {
        delimiter: b';',
        skip_lines: 0,
        has_header: true,
        number: NumberFormat {
            decimal_comma: true,
            missing_sentinel: Some(9999.0),
        },
    };
    let raw = read_records(text, &layout)?;
    let date_idx = header_index(&raw, "date", "ampac")?;

    let stamps = raw
        .records
        .iter()
        .map(|r| {
            cell(r, date_idx).and_then(|s| {
                parse_timestamp(
                    s,
                    &[
                        "%Y-%m-%d %H:%M:%S",
                        "%Y-%m-%d %H:%M",
                        "%Y-%m-%dT%H:%M:%S",
                        "%d.%m.%Y %H:%M:%S",
                        "%d.%m.%Y %H:%M",
                    ],
                    &["%Y-%m-%d", "%d.%m.%Y"],
                )
            })
        })
        .collect();

    let fields = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != date_idx && !name.is_empty())
        .map(|(idx, name)| infer_column(name, column_values(&raw, idx), layout.number))
        .collect();

    build_table("ampac", stamps, fields)
}

fn header_index(raw: &RawRecords, name: &str, source: &str) -> Result<usize, AppError> {
    raw.headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AppError::missing_field(name, source))
}

fn column_values(raw: &RawRecords, idx: usize) -> Vec<Option<String>> {
    raw.records
        .iter()
        .map(|r| cell(r, idx).map(str::to_string))
        .collect()
}
