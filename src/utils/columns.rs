use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;

use serde_json::Value;

use crate::models::cell::{CellKind, classify, numeric_value, render};
use crate::models::query_result::Row;
use crate::models::sort::SortDir;

static NULL: Value = Value::Null;

/// How a whole column is ordered, decided by one scan over its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// every non-null value is a number or a numeric string
    Numeric,
    /// every non-null value is a `YYYY-MM-DD` date
    Date,
    #[default]
    Text,
}

impl ColumnKind {
    pub fn scan<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let (mut numeric, mut date, mut seen) = (true, true, false);
        for value in values {
            match classify(value) {
                CellKind::Null => continue,
                CellKind::Number | CellKind::NumericString => date = false,
                CellKind::DateString => numeric = false,
                CellKind::PlainString => return ColumnKind::Text,
            }
            seen = true;
        }
        match (seen, numeric, date) {
            (true, true, _) => ColumnKind::Numeric,
            (true, _, true) => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColDef {
    /// key into the row record
    pub key: String,
    pub kind: ColumnKind,
}

impl ColDef {
    pub fn new(key: impl Into<String>, kind: ColumnKind) -> Self {
        Self { key: key.into(), kind }
    }

    /// Builds one column definition per key, scanning every row once per column.
    pub fn from_rows<R: Borrow<Row>>(keys: &[String], rows: &[R]) -> Vec<ColDef> {
        keys.iter()
            .map(|key| {
                let cells = rows.iter().map(|row| {
                    let row: &Row = row.borrow();
                    row.get(key).unwrap_or(&NULL)
                });
                let kind = ColumnKind::scan(cells);
                ColDef::new(key.as_str(), kind)
            })
            .collect()
    }

    /// Cell of this column in `row`; a missing key reads as null.
    #[inline]
    pub fn cell<'a>(&self, row: &'a Row) -> &'a Value {
        row.get(&self.key).unwrap_or(&NULL)
    }

    /// Compare two rows on this column, ascending.
    #[inline]
    pub fn cmp(&self, a: &Row, b: &Row) -> Ordering {
        let ka = SortKey::of(self.kind, self.cell(a));
        let kb = SortKey::of(self.kind, self.cell(b));
        ka.cmp(&kb)
    }

    /// Descending is the ascending result reversed, so the two stay symmetric.
    #[inline]
    pub fn ordering(&self, a: &Row, b: &Row, dir: SortDir) -> Ordering {
        dir.apply(self.cmp(a, b))
    }
}

/// Comparable projection of a cell under a given [`ColumnKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    F64(f64),
    Str(Cow<'a, str>),
    Null,
}

impl<'a> SortKey<'a> {
    pub fn of(kind: ColumnKind, value: &'a Value) -> Self {
        if value.is_null() {
            return SortKey::Null;
        }
        if kind == ColumnKind::Numeric
            && let Some(v) = numeric_value(value)
        {
            return SortKey::F64(v);
        }
        // dates are fixed-width and zero-padded, text order is chronological order
        match render(value) {
            Some(text) => SortKey::Str(text),
            None => SortKey::Null,
        }
    }

    /// Nulls sort after every other value; two nulls are equal.
    pub fn cmp(&self, other: &Self) -> Ordering {
        use SortKey::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (F64(a), F64(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Str(a), Str(b)) => a.as_ref().cmp(b.as_ref()),
            (F64(a), Str(b)) => a.to_string().as_str().cmp(b.as_ref()),
            (Str(a), F64(b)) => a.as_ref().cmp(b.to_string().as_str()),
        }
    }
}
