use chrono::NaiveDateTime;

use crate::error::Result;
use crate::schema::field::{FieldKind, TypedFieldValue};
use crate::serial;
use crate::sheet::NormalizedSheet;

/// Coerces the cell at `(row, column)` of a sheet, where row 0 is the header.
///
/// Only out-of-bounds coordinates are an error; a cell that does not parse is
/// returned with its success flag cleared.
pub fn coerce(
    sheet: &NormalizedSheet,
    row: usize,
    column: usize,
    kind: FieldKind,
) -> Result<TypedFieldValue> {
    let original = sheet.text(row, column)?;
    let precision = sheet.precision_text(row, column)?;
    Ok(coerce_cell(kind, original, precision))
}

/// Coerces one cell given both renderings of it.
///
/// Text uses the displayed rendering; every other kind parses the full
/// precision rendering.
pub fn coerce_cell(kind: FieldKind, original: &str, precision: &str) -> TypedFieldValue {
    let raw = precision.to_string();
    match kind {
        FieldKind::Text => TypedFieldValue::Text {
            value: original.to_string(),
        },
        FieldKind::Integer => match parse_number(precision) {
            Some(number) => TypedFieldValue::Integer {
                value: number.trunc() as i64,
                raw,
                success: true,
            },
            None => TypedFieldValue::Integer {
                value: 0,
                raw,
                success: false,
            },
        },
        FieldKind::Decimal => match parse_number(precision) {
            Some(number) => TypedFieldValue::Decimal {
                value: number,
                raw,
                success: true,
            },
            None => TypedFieldValue::Decimal {
                value: 0.0,
                raw,
                success: false,
            },
        },
        FieldKind::Timestamp => match parse_number(precision).and_then(serial::to_datetime) {
            Some(datetime) => TypedFieldValue::Timestamp {
                value: datetime,
                raw,
                success: true,
            },
            None => TypedFieldValue::Timestamp {
                value: NaiveDateTime::default(),
                raw,
                success: false,
            },
        },
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}
