//! Typed column storage.
//!
//! Missing values are `NaN` for numeric columns and `None` for the others.

use crate::domain::Stamp;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Time(Vec<Option<Stamp>>),
    Numeric(Vec<f64>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Time(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Time(_) => "timestamp",
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Text(_) => "text",
        }
    }

    /// An all-missing column of the same type.
    pub fn missing(&self, len: usize) -> ColumnData {
        match self {
            ColumnData::Time(_) => ColumnData::Time(vec![None; len]),
            ColumnData::Numeric(_) => ColumnData::Numeric(vec![f64::NAN; len]),
            ColumnData::Text(_) => ColumnData::Text(vec![None; len]),
        }
    }

    /// Gather rows by index; `None` produces a missing value.
    pub fn take(&self, rows: &[Option<usize>]) -> ColumnData {
        match self {
            ColumnData::Time(v) => ColumnData::Time(rows.iter().map(|r| r.and_then(|i| v[i])).collect()),
            ColumnData::Numeric(v) => {
                ColumnData::Numeric(rows.iter().map(|r| r.map_or(f64::NAN, |i| v[i])).collect())
            }
            ColumnData::Text(v) => {
                ColumnData::Text(rows.iter().map(|r| r.and_then(|i| v[i].clone())).collect())
            }
        }
    }

    /// Append `other` after `self`. Both must have the same type.
    pub fn append(&mut self, other: &ColumnData) -> Result<(), AppError> {
        match (self, other) {
            (ColumnData::Time(a), ColumnData::Time(b)) => a.extend_from_slice(b),
            (ColumnData::Numeric(a), ColumnData::Numeric(b)) => a.extend_from_slice(b),
            (ColumnData::Text(a), ColumnData::Text(b)) => a.extend(b.iter().cloned()),
            (a, b) => {
                return Err(AppError::schema(format!(
                    "Cannot append {} values to a {} column",
                    b.type_name(),
                    a.type_name()
                )));
            }
        }
        Ok(())
    }

    /// Pad with missing values up to `len` rows.
    pub fn pad_to(&mut self, len: usize) {
        match self {
            ColumnData::Time(v) => v.resize(len, None),
            ColumnData::Numeric(v) => v.resize(len, f64::NAN),
            ColumnData::Text(v) => v.resize(len, None),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn time(name: impl Into<String>, values: Vec<Option<Stamp>>) -> Self {
        Self::new(name, ColumnData::Time(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&[Option<Stamp>]> {
        match &self.data {
            ColumnData::Time(v) => Some(v),
            _ => None,
        }
    }
}
