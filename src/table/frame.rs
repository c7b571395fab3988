//! `TimeSeriesTable`: an ordered set of records with named, typed columns.
//!
//! Tables are treated as values. Every transformation in `harmonize` and
//! `fit` builds a new table rather than mutating its input.

use crate::domain::Stamp;
use crate::error::AppError;
use crate::table::column::Column;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    /// Human-readable origin (source name, "merged", ...) used in error messages.
    label: String,
    columns: Vec<Column>,
    n_rows: usize,
}

impl TimeSeriesTable {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            columns: Vec::new(),
            n_rows: 0,
        }
    }

    /// Build a table from columns of equal length with unique names.
    pub fn from_columns(label: impl Into<String>, columns: Vec<Column>) -> Result<Self, AppError> {
        let mut table = Self::empty(label);
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Look up a column, failing with a field-not-found error.
    pub fn require(&self, name: &str) -> Result<&Column, AppError> {
        self.column(name)
            .ok_or_else(|| AppError::missing_field(name, &self.label))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], AppError> {
        let column = self.require(name)?;
        column.as_numeric().ok_or_else(|| {
            AppError::schema(format!(
                "Field `{name}` in {} table is {}, expected numeric",
                self.label,
                column.data.type_name()
            ))
        })
    }

    pub fn time(&self, name: &str) -> Result<&[Option<Stamp>], AppError> {
        let column = self.require(name)?;
        column.as_time().ok_or_else(|| {
            AppError::schema(format!(
                "Field `{name}` in {} table is {}, expected timestamps",
                self.label,
                column.data.type_name()
            ))
        })
    }

    /// Append a new column. Fails on duplicate names or length mismatch.
    pub fn push_column(&mut self, column: Column) -> Result<(), AppError> {
        if self.has_column(&column.name) {
            return Err(AppError::schema(format!(
                "Duplicate field `{}` in {} table",
                column.name, self.label
            )));
        }
        self.check_len(&column)?;
        self.n_rows = column.len();
        self.columns.push(column);
        Ok(())
    }

    /// Insert or replace a column by name.
    pub fn set_column(&mut self, column: Column) -> Result<(), AppError> {
        self.check_len(&column)?;
        self.n_rows = column.len();
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Gather rows by index into a new table; `None` yields a missing row.
    pub fn take_rows(&self, rows: &[Option<usize>]) -> TimeSeriesTable {
        TimeSeriesTable {
            label: self.label.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
                .collect(),
            n_rows: rows.len(),
        }
    }

    /// Stable sort by a timestamp column; missing timestamps go last.
    pub fn sorted_by_time(&self, key: &str) -> Result<TimeSeriesTable, AppError> {
        let stamps = self.time(key)?;
        let mut order: Vec<usize> = (0..self.n_rows).collect();
        order.sort_by_key(|&i| (stamps[i].is_none(), stamps[i]));
        let rows: Vec<Option<usize>> = order.into_iter().map(Some).collect();
        Ok(self.take_rows(&rows))
    }

    fn check_len(&self, column: &Column) -> Result<(), AppError> {
        // The first column defines the row count.
        if !self.columns.is_empty() && column.len() != self.n_rows {
            return Err(AppError::schema(format!(
                "Field `{}` has {} rows but {} table has {}",
                column.name,
                column.len(),
                self.label,
                self.n_rows
            )));
        }
        Ok(())
    }
}
