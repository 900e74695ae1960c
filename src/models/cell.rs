use std::borrow::Cow;

use serde_json::Value;
use strum::Display;
use time::Date;
use time::macros::format_description;

/// Shape of a single cell, as far as ordering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CellKind {
    Number,
    NumericString,
    DateString,
    PlainString,
    Null,
}

pub fn classify(value: &Value) -> CellKind {
    match value {
        Value::Null => CellKind::Null,
        Value::Number(n) if n.as_f64().is_some_and(f64::is_finite) => CellKind::Number,
        Value::String(s) if parse_numeric_str(s).is_some() => CellKind::NumericString,
        Value::String(s) if is_date_str(s) => CellKind::DateString,
        _ => CellKind::PlainString,
    }
}

/// Numeric value of a number or numeric-string cell.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

/// Parses a signed decimal: at most one leading sign, at most one `.`, at least one digit.
/// Exponents and surrounding whitespace are rejected.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `YYYY-MM-DD` that is also a real calendar day.
pub fn is_date_str(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if !bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit()) {
        return false;
    }
    Date::parse(s, format_description!("[year]-[month]-[day]")).is_ok()
}

/// Text shown in the grid and used for text ordering and filtering.
/// `None` for null cells.
pub fn render(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}
