//! A single spreadsheet cell value, and the conversions between cells, JSON values and the column
//! kinds of the ledger schema.

use crate::error::Res;
use crate::model::schema::{Column, ColumnKind};
use crate::model::Amount;
use anyhow::{bail, Context};
use calamine::Data;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use std::str::FromStr;

/// The format that dates are stored and accepted in.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The separator used when a list of tags is stored in one cell.
pub const TAG_SEPARATOR: char = ',';

/// The value of one cell. Formatting is not modeled, only values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    /// True for an empty cell or a cell that holds only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    /// The cell's text, if it is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Decodes the cell into the JSON value that a record exposes for a column of `kind`.
    ///
    /// Cells that do not look like their column's kind (for example text typed into an amount
    /// column by hand) are passed through as-is rather than dropped.
    pub fn to_json(&self, kind: ColumnKind) -> Value {
        match (kind, self) {
            (ColumnKind::Tags, Cell::Empty) => Value::Array(Vec::new()),
            (ColumnKind::Tags, Cell::Text(s)) => Value::Array(
                split_tags(s)
                    .into_iter()
                    .map(|t| Value::String(t.to_string()))
                    .collect(),
            ),
            (ColumnKind::Flag, Cell::Empty) => Value::Bool(false),
            (ColumnKind::Flag, Cell::Text(s)) => match parse_flag(s) {
                Some(b) => Value::Bool(b),
                None => Value::String(s.clone()),
            },
            (ColumnKind::Flag, Cell::Number(n)) => Value::Bool(*n != 0.0),
            (ColumnKind::Decimal, Cell::Text(s)) => match Amount::from_str(s) {
                Ok(amount) => number(amount.to_f64()),
                Err(_) => Value::String(s.clone()),
            },
            (ColumnKind::Date, Cell::Number(n)) => match serial_to_date(*n) {
                Some(date) => Value::String(date.format(DATE_FORMAT).to_string()),
                None => number(*n),
            },
            (_, Cell::Empty) => Value::Null,
            (_, Cell::Text(s)) => Value::String(s.clone()),
            (_, Cell::Number(n)) => number(*n),
            (_, Cell::Bool(b)) => Value::Bool(*b),
        }
    }

    /// Coerces a JSON value from an update request into a cell for `column`.
    ///
    /// # Errors
    /// - When the value cannot be represented in the column, e.g. `"soon"` for `Date`, or any
    ///   object.
    pub fn from_update(column: Column, value: &Value) -> Res<Cell> {
        if value.is_object() {
            bail!("The value for '{column}' cannot be an object");
        }
        if value.is_null() {
            // A flag is always written so that a row is never stored as fully empty.
            return Ok(match column.kind() {
                ColumnKind::Flag => Cell::Bool(false),
                _ => Cell::Empty,
            });
        }
        match column.kind() {
            ColumnKind::Text => match value {
                Value::String(s) => Ok(Cell::text(s.as_str())),
                Value::Number(n) => Ok(Cell::Text(n.to_string())),
                Value::Bool(b) => Ok(Cell::Text(b.to_string())),
                _ => bail!("The value for '{column}' must be text"),
            },
            ColumnKind::Date => {
                let s = value
                    .as_str()
                    .with_context(|| format!("The value for '{column}' must be a date string"))?;
                if s.is_empty() {
                    return Ok(Cell::Empty);
                }
                let date = NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| {
                    format!("The value '{s}' for '{column}' is not a YYYY-MM-DD date")
                })?;
                Ok(Cell::Text(date.format(DATE_FORMAT).to_string()))
            }
            ColumnKind::Decimal => {
                let amount: Amount = serde_json::from_value(value.clone())
                    .with_context(|| format!("The value for '{column}' must be a number"))?;
                Ok(Cell::Number(amount.to_f64()))
            }
            ColumnKind::Tags => match value {
                Value::Array(items) => {
                    let tags = items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(n) => Ok(n.to_string()),
                            _ => bail!("Each entry of '{column}' must be a string"),
                        })
                        .collect::<Res<Vec<String>>>()?;
                    Ok(join_tags(&tags))
                }
                Value::String(s) => Ok(Cell::text(s.as_str())),
                _ => bail!("The value for '{column}' must be a list of strings"),
            },
            ColumnKind::Flag => match value {
                Value::Bool(b) => Ok(Cell::Bool(*b)),
                Value::String(s) => parse_flag(s)
                    .map(Cell::Bool)
                    .with_context(|| format!("The value '{s}' for '{column}' is not a boolean")),
                _ => bail!("The value for '{column}' must be a boolean"),
            },
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::text(s.as_str()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::text(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<Amount> for Cell {
    fn from(value: Amount) -> Self {
        Cell::Number(value.to_f64())
    }
}

/// Joins tags into one cell. An empty list is an empty cell.
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> Cell {
    let joined = tags
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(&TAG_SEPARATOR.to_string());
    Cell::text(joined)
}

/// Splits a stored tag string, dropping empty segments.
pub fn split_tags(s: &str) -> Vec<&str> {
    s.split(TAG_SEPARATOR).filter(|t| !t.is_empty()).collect()
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" | "" => Some(false),
        _ => None,
    }
}

/// Whole numbers are emitted as JSON integers so that `120` does not come back as `120.0`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Converts a spreadsheet date serial number (days since 1899-12-30) into a date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
