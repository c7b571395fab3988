//! Alignment of aggregated tables: key-based merge and plain concatenation.
//!
//! `merge` folds tables pairwise from left to right, each step a relational
//! join on the same timestamp field:
//!
//! - `inner`: keys present on both sides
//! - `left` / `right`: every row of one side, matched where possible
//! - `outer`: union of keys, sorted, missing values where unmatched
//!
//! Many-to-many matches produce every combination. Non-key fields present on
//! both sides are suffixed `_x` (left) and `_y` (right). Missing keys never match.

use std::collections::{HashMap, HashSet};

use crate::domain::{Axis, JoinHow, Stamp};
use crate::error::AppError;
use crate::table::{Column, ColumnData, TimeSeriesTable};

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Row pairing produced by a join: `(left_row, right_row)`.
type RowPair = (Option<usize>, Option<usize>);

/// Merge tables on the timestamp field `on`.
pub fn merge(tables: &[TimeSeriesTable], how: JoinHow, on: &str) -> Result<TimeSeriesTable, AppError> {
    let (first, rest) = tables
        .split_first()
        .ok_or_else(|| AppError::invalid("merge requires at least one table"))?;
    first.time(on)?;

    let mut merged = first.clone();
    for right in rest {
        merged = join_pair(&merged, right, how, on)?;
        log::debug!(
            "{:?} join with {} table on `{on}`: {} rows, {} fields",
            how,
            right.label(),
            merged.n_rows(),
            merged.n_cols()
        );
    }
    Ok(merged.with_label("merged"))
}

/// Concatenate tables along rows or columns.
///
/// Row-wise, fields are matched by name (first-seen order) and gaps are filled
/// with missing values; duplicate keys are kept. Column-wise, tables are placed
/// side by side by position and shorter tables are padded.
pub fn concat(tables: &[TimeSeriesTable], axis: Axis) -> Result<TimeSeriesTable, AppError> {
    if tables.is_empty() {
        return Err(AppError::invalid("concat requires at least one table"));
    }
    match axis {
        Axis::Rows => concat_rows(tables),
        Axis::Columns => concat_columns(tables),
    }
}

fn join_pair(
    left: &TimeSeriesTable,
    right: &TimeSeriesTable,
    how: JoinHow,
    on: &str,
) -> Result<TimeSeriesTable, AppError> {
    let left_keys = left.time(on)?;
    let right_keys = right.time(on)?;

    let mut pairs = match how {
        JoinHow::Inner => probe(left_keys, right_keys, false),
        JoinHow::Left => probe(left_keys, right_keys, true),
        JoinHow::Right => probe(right_keys, left_keys, true)
            .into_iter()
            .map(|(r, l)| (l, r))
            .collect(),
        JoinHow::Outer => {
            let mut pairs = probe(left_keys, right_keys, true);
            let matched: HashSet<usize> = pairs.iter().filter_map(|&(_, r)| r).collect();
            pairs.extend(
                (0..right_keys.len())
                    .filter(|r| !matched.contains(r))
                    .map(|r| (None, Some(r))),
            );
            pairs
        }
    };

    let key_of = |&(l, r): &RowPair| -> Option<Stamp> {
        l.and_then(|i| left_keys[i]).or_else(|| r.and_then(|i| right_keys[i]))
    };
    if how == JoinHow::Outer {
        pairs.sort_by_key(|p| {
            let key = key_of(p);
            (key.is_none(), key)
        });
    }

    let left_rows: Vec<Option<usize>> = pairs.iter().map(|&(l, _)| l).collect();
    let right_rows: Vec<Option<usize>> = pairs.iter().map(|&(_, r)| r).collect();
    let keys: Vec<Option<Stamp>> = pairs.iter().map(key_of).collect();

    let right_names: HashSet<&str> = right.column_names().filter(|n| *n != on).collect();
    let left_names: HashSet<&str> = left.column_names().filter(|n| *n != on).collect();

    let mut columns = Vec::with_capacity(left.n_cols() + right.n_cols());
    for column in left.columns() {
        if column.name == on {
            columns.push(Column::time(on, keys.clone()));
            continue;
        }
        let name = if right_names.contains(column.name.as_str()) {
            format!("{}{LEFT_SUFFIX}", column.name)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, column.data.take(&left_rows)));
    }
    for column in right.columns() {
        if column.name == on {
            continue;
        }
        let name = if left_names.contains(column.name.as_str()) {
            format!("{}{RIGHT_SUFFIX}", column.name)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, column.data.take(&right_rows)));
    }

    TimeSeriesTable::from_columns(left.label(), columns)
}

/// Pair every row of `outer` with its matches in `inner`, in `outer` order.
/// With `keep_unmatched`, rows without a match are kept with `None`.
fn probe(outer: &[Option<Stamp>], inner: &[Option<Stamp>], keep_unmatched: bool) -> Vec<RowPair> {
    let mut index: HashMap<Stamp, Vec<usize>> = HashMap::new();
    for (row, key) in inner.iter().enumerate() {
        if let Some(key) = key {
            index.entry(*key).or_default().push(row);
        }
    }

    let mut pairs = Vec::with_capacity(outer.len());
    for (row, key) in outer.iter().enumerate() {
        match key.and_then(|k| index.get(&k)) {
            Some(matches) => pairs.extend(matches.iter().map(|&m| (Some(row), Some(m)))),
            None if keep_unmatched => pairs.push((Some(row), None)),
            None => {}
        }
    }
    pairs
}

fn concat_rows(tables: &[TimeSeriesTable]) -> Result<TimeSeriesTable, AppError> {
    let mut columns: Vec<Column> = Vec::new();
    for table in tables {
        for column in table.columns() {
            if !columns.iter().any(|c| c.name == column.name) {
                columns.push(Column::new(column.name.clone(), column.data.missing(0)));
            }
        }
    }

    for table in tables {
        for target in columns.iter_mut() {
            match table.column(&target.name) {
                Some(source) => target.data.append(&source.data).map_err(|e| {
                    AppError::schema(format!("Field `{}` in {} table: {e}", target.name, table.label()))
                })?,
                None => {
                    let gap = target.data.missing(table.n_rows());
                    target.data.append(&gap)?;
                }
            }
        }
    }

    TimeSeriesTable::from_columns("concat", columns)
}

fn concat_columns(tables: &[TimeSeriesTable]) -> Result<TimeSeriesTable, AppError> {
    let n_rows = tables.iter().map(TimeSeriesTable::n_rows).max().unwrap_or(0);
    let mut out = TimeSeriesTable::empty("concat");
    for table in tables {
        for column in table.columns() {
            let mut data: ColumnData = column.data.clone();
            data.pad_to(n_rows);
            out.push_column(Column::new(column.name.clone(), data))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DATE_KEY, DATETIME_KEY};
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn day(d: u32) -> Option<Stamp> {
        Some(Stamp::Date(NaiveDate::from_ymd_opt(2021, 5, d).unwrap()))
    }

    fn table(label: &str, days: &[u32], field: &str, values: &[f64]) -> TimeSeriesTable {
        TimeSeriesTable::from_columns(
            label,
            vec![
                Column::time(DATE_KEY, days.iter().map(|&d| day(d)).collect()),
                Column::numeric(field, values.to_vec()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn inner_keeps_keys_present_everywhere() {
        let a = table("a", &[1, 2, 3], "T", &[1.0, 2.0, 3.0]);
        let b = table("b", &[2, 3, 4], "t_air", &[20.0, 30.0, 40.0]);
        let c = table("c", &[3, 2], "rh", &[0.3, 0.2]);

        let out = merge(&[a, b, c], JoinHow::Inner, DATE_KEY).unwrap();
        assert_eq!(out.time(DATE_KEY).unwrap(), &[day(2), day(3)]);
        assert_eq!(out.numeric("T").unwrap(), &[2.0, 3.0]);
        assert_eq!(out.numeric("t_air").unwrap(), &[20.0, 30.0]);
        assert_eq!(out.numeric("rh").unwrap(), &[0.2, 0.3]);
    }

    #[test]
    fn outer_returns_sorted_union_with_gaps() {
        let a = table("a", &[3, 1], "T", &[3.0, 1.0]);
        let b = table("b", &[2, 3], "t_air", &[20.0, 30.0]);

        let out = merge(&[a, b], JoinHow::Outer, DATE_KEY).unwrap();
        assert_eq!(out.time(DATE_KEY).unwrap(), &[day(1), day(2), day(3)]);
        let t = out.numeric("T").unwrap();
        assert_eq!(t[0], 1.0);
        assert!(t[1].is_nan());
        assert_eq!(t[2], 3.0);
        let t_air = out.numeric("t_air").unwrap();
        assert!(t_air[0].is_nan());
        assert_eq!(&t_air[1..], &[20.0, 30.0]);
    }

    #[test]
    fn left_and_right_preserve_one_side() {
        let a = table("a", &[1, 2], "T", &[1.0, 2.0]);
        let b = table("b", &[2, 5], "t_air", &[20.0, 50.0]);

        let left = merge(&[a.clone(), b.clone()], JoinHow::Left, DATE_KEY).unwrap();
        assert_eq!(left.time(DATE_KEY).unwrap(), &[day(1), day(2)]);
        assert!(left.numeric("t_air").unwrap()[0].is_nan());

        let right = merge(&[a, b], JoinHow::Right, DATE_KEY).unwrap();
        assert_eq!(right.time(DATE_KEY).unwrap(), &[day(2), day(5)]);
        assert_eq!(right.numeric("T").unwrap()[0], 2.0);
        assert!(right.numeric("T").unwrap()[1].is_nan());
    }

    #[test]
    fn overlapping_fields_are_suffixed() {
        let a = table("a", &[1], "T", &[1.0]);
        let b = table("b", &[1], "T", &[2.0]);
        let out = merge(&[a, b], JoinHow::Inner, DATE_KEY).unwrap();
        assert_eq!(out.numeric("T_x").unwrap(), &[1.0]);
        assert_eq!(out.numeric("T_y").unwrap(), &[2.0]);
    }

    #[test]
    fn duplicate_keys_multiply_rows() {
        let a = table("a", &[1, 1], "T", &[1.0, 2.0]);
        let b = table("b", &[1, 1], "t_air", &[10.0, 20.0]);
        let out = merge(&[a, b], JoinHow::Inner, DATE_KEY).unwrap();
        assert_eq!(out.n_rows(), 4);
    }

    #[test]
    fn mismatched_granularity_matches_nothing() {
        let a = table("a", &[1], "T", &[1.0]);
        let stamp = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let b = TimeSeriesTable::from_columns(
            "b",
            vec![
                Column::time(DATE_KEY, vec![Some(Stamp::DateTime(stamp))]),
                Column::numeric("t_air", vec![1.0]),
            ],
        )
        .unwrap();
        let out = merge(&[a, b], JoinHow::Inner, DATE_KEY).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn merge_requires_the_key_field() {
        let a = table("a", &[1], "T", &[1.0]);
        let err = merge(&[a], JoinHow::Inner, DATETIME_KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
        assert!(merge(&[], JoinHow::Inner, DATE_KEY).is_err());
    }

    #[test]
    fn concat_rows_sums_row_counts_and_keeps_duplicates() {
        let a = table("a", &[1, 2], "T", &[1.0, 2.0]);
        let b = table("b", &[2, 3, 4], "t_air", &[2.0, 3.0, 4.0]);
        let out = concat(&[a, b], Axis::Rows).unwrap();
        assert_eq!(out.n_rows(), 5);
        assert_eq!(out.n_cols(), 3);
        assert_eq!(out.time(DATE_KEY).unwrap()[1], out.time(DATE_KEY).unwrap()[2]);
        assert!(out.numeric("T").unwrap()[4].is_nan());
    }

    #[test]
    fn concat_columns_sums_column_counts() {
        let a = table("a", &[1, 2], "T", &[1.0, 2.0]);
        let b = TimeSeriesTable::from_columns(
            "b",
            vec![
                Column::time(DATETIME_KEY, vec![None]),
                Column::numeric("t_air", vec![5.0]),
            ],
        )
        .unwrap();
        let out = concat(&[a.clone(), b], Axis::Columns).unwrap();
        assert_eq!(out.n_cols(), 4);
        assert_eq!(out.n_rows(), 2);
        assert!(out.numeric("t_air").unwrap()[1].is_nan());

        let err = concat(&[a.clone(), a], Axis::Columns).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }
}
