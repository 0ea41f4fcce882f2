use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::serial;

/// Pattern used when a date-time is rendered without an explicit format.
pub const DATETIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
/// Pattern used when a date without a time of day is rendered.
pub const DATE_PATTERN: &str = "%Y-%m-%d";

/// Decimal places of the style used to read a number at full precision.
pub const PRECISION_DECIMALS: u8 = 15;

/// A value stored in, or written to, a spreadsheet cell.
///
/// The same four kinds are used on the read side for coercion, so values that
/// are read back and re-emitted never pass through an untyped representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// Best-effort conversion of display text into a typed value.
    ///
    /// Tries `M-D-YY` dates, then integers, then finite decimals, and falls
    /// back to text. The heuristic is order dependent and only meant for
    /// writing string grids back out with sensible cell types.
    pub fn infer(text: &str) -> CellValue {
        if let Some(datetime) = parse_short_date(text) {
            return CellValue::Timestamp(datetime);
        }
        if let Ok(value) = text.parse::<i64>() {
            return CellValue::Integer(value);
        }
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() {
                return CellValue::Decimal(value);
            }
        }
        CellValue::Text(text.to_string())
    }

    /// Numeric view of the value: numbers as-is and timestamps as serial days.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Text(_) => None,
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Decimal(value) => Some(*value),
            CellValue::Timestamp(datetime) => Some(serial::from_datetime(datetime)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Timestamp(value)
    }
}

/// Display format attached to a cell through its style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    /// Numbers shown with up to nine decimals, trailing zeros removed.
    General,
    /// Numbers shown with a fixed number of decimals.
    Fixed(u8),
    /// Numbers interpreted as serial dates and shown with a strftime pattern.
    Date(String),
}

impl NumberFormat {
    /// Format used to read a number at full stored precision.
    pub fn precision() -> Self {
        NumberFormat::Fixed(PRECISION_DECIMALS)
    }

    /// Renders a cell value the way it would be displayed under this format.
    /// Text is never affected by the number format.
    pub fn render(&self, value: &CellValue) -> String {
        match (self, value) {
            (_, CellValue::Text(text)) => text.clone(),
            (NumberFormat::General, CellValue::Timestamp(datetime)) => default_datetime(datetime),
            (NumberFormat::General, other) => general_number(other.as_number().unwrap_or_default()),
            (NumberFormat::Fixed(places), other) => {
                let number = other.as_number().unwrap_or_default();
                format!("{:.*}", usize::from(*places), number)
            }
            (NumberFormat::Date(pattern), CellValue::Timestamp(datetime)) => {
                format_datetime(datetime, pattern).unwrap_or_else(|| default_datetime(datetime))
            }
            (NumberFormat::Date(pattern), other) => {
                let number = other.as_number().unwrap_or_default();
                serial::to_datetime(number)
                    .and_then(|datetime| format_datetime(&datetime, pattern))
                    .unwrap_or_else(|| general_number(number))
            }
        }
    }
}

fn general_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        return format!("{}", number as i64);
    }
    let text = format!("{number:.9}");
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn default_datetime(datetime: &NaiveDateTime) -> String {
    let pattern = if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 {
        DATE_PATTERN
    } else {
        DATETIME_PATTERN
    };
    datetime.format(pattern).to_string()
}

/// Formats a date-time with a user supplied pattern, returning `None` when the
/// pattern is malformed or cannot be applied to a date-time without zone.
pub fn format_datetime(datetime: &NaiveDateTime, pattern: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut text = String::new();
    write!(text, "{}", datetime.format_with_items(items.iter())).ok()?;
    Some(text)
}

fn parse_short_date(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split('-');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let month: u32 = month.parse().ok().filter(|value| (1..=12).contains(value))?;
    let day: u32 = day.parse().ok().filter(|value| (1..=31).contains(value))?;
    let year: i32 = year.parse().ok().filter(|value| (1..=99).contains(value))?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)?.and_hms_opt(0, 0, 0)
}
