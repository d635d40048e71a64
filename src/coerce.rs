//! Cell coercion for the schema-first load pass.
//!
//! Coercion is deliberately permissive. A numeric-looking cell is first
//! reinterpreted on its own terms (see [`reinterpret`]) and only then
//! reconciled with its column's resolved type, so a sampled schema can still
//! accept values that disagree with it. The one hard failure is a
//! non-numeric cell in a numeric column, which the loader counts against the
//! row.

use crate::{
    classify::is_whole_number,
    error::RowError,
    schema::{ColumnType, Schema},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Float(f64),
}

/// Reads a trimmed cell as a number when it is plain digits with at most one
/// decimal separator.
///
/// `"20.0"` becomes the integer 20 because its fraction is zero, `"10.5"`
/// stays a float, and an all-digit value too wide for `i64` falls back to a
/// float. Anything else is not numeric here.
pub fn reinterpret(value: &str) -> Option<Numeric> {
    let trimmed = value.trim();
    if is_whole_number(trimmed) {
        return Some(match trimmed.parse::<i64>() {
            Ok(parsed) => Numeric::Integer(parsed),
            Err(_) => Numeric::Float(trimmed.parse::<f64>().ok()?),
        });
    }
    let (whole, fraction) = trimmed.split_once('.')?;
    let whole_digits = whole.strip_prefix(['+', '-']).unwrap_or(whole);
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole_digits.len() + fraction.len() == 0 || !all_digits(whole_digits) || !all_digits(fraction)
    {
        return None;
    }
    if fraction.bytes().all(|b| b == b'0') {
        let whole_value = if whole_digits.is_empty() {
            Ok(0)
        } else {
            whole.parse::<i64>()
        };
        if let Ok(value) = whole_value {
            return Some(Numeric::Integer(value));
        }
    }
    Some(Numeric::Float(trimmed.parse::<f64>().ok()?))
}

/// Coerces one cell for a column of type `datatype`.
pub fn coerce_cell(column: &str, raw: &str, datatype: ColumnType) -> Result<SqlValue, RowError> {
    let mismatch = || RowError::Coercion {
        column: column.to_string(),
        expected: datatype,
        value: raw.to_string(),
    };
    match datatype {
        ColumnType::Text => Ok(SqlValue::Text(raw.to_string())),
        ColumnType::Integer => match reinterpret(raw) {
            Some(Numeric::Integer(value)) => Ok(SqlValue::Integer(value)),
            Some(Numeric::Float(value)) => Ok(SqlValue::Float(value)),
            None => Err(mismatch()),
        },
        ColumnType::Float => match reinterpret(raw) {
            Some(Numeric::Integer(value)) => Ok(SqlValue::Float(value as f64)),
            Some(Numeric::Float(value)) => Ok(SqlValue::Float(value)),
            None => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(SqlValue::Float)
                .ok_or_else(mismatch),
        },
    }
}

/// Coerces a whole row in column order, stopping at the first bad cell.
pub fn coerce_row<S: AsRef<str>>(schema: &Schema, row: &[S]) -> Result<Vec<SqlValue>, RowError> {
    if row.len() != schema.len() {
        return Err(RowError::Arity {
            expected: schema.len(),
            found: row.len(),
        });
    }
    schema
        .columns
        .iter()
        .zip(row)
        .map(|(column, cell)| coerce_cell(&column.name, cell.as_ref(), column.datatype))
        .collect()
}
