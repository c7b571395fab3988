//! Export harmonized tables (CSV) and model reports (JSON).
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::ModelReport;
use crate::error::AppError;
use crate::table::{ColumnData, TimeSeriesTable};

/// Write a table to CSV. Missing values are written as empty fields.
pub fn write_table_csv(path: &Path, table: &TimeSeriesTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(table.column_names())
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for row in 0..table.n_rows() {
        let record: Vec<String> = table.columns().iter().map(|c| format_cell(&c.data, row)).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))
}

/// Write the per-pair model report as pretty JSON. Undefined statistics are `null`.
pub fn write_report_json(path: &Path, report: &ModelReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))
}

fn format_cell(data: &ColumnData, row: usize) -> String {
    match data {
        ColumnData::Time(v) => v[row].map(|s| s.to_string()).unwrap_or_default(),
        ColumnData::Numeric(v) if v[row].is_nan() => String::new(),
        ColumnData::Numeric(v) => v[row].to_string(),
        ColumnData::Text(v) => v[row].clone().unwrap_or_default(),
    }
}
