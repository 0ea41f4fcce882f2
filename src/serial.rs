//! Conversion between spreadsheet serial dates and calendar date-times.
//!
//! Serial day 0 is 1899-12-30 at midnight, which absorbs the 1900 leap year
//! bug for every date after February 1900. The fractional part of a serial is
//! the time of day, rounded to the nearest millisecond.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Converts a serial day count into a date-time.
///
/// Returns `None` for negative or non-finite serials and for serials that fall
/// outside the representable calendar range.
pub fn to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    let offset = Duration::try_milliseconds(millis as i64)?;
    epoch().checked_add_signed(offset)
}

/// Converts a date-time into its serial day count.
pub fn from_datetime(datetime: &NaiveDateTime) -> f64 {
    let offset = *datetime - epoch();
    offset.num_milliseconds() as f64 / MILLIS_PER_DAY
}
