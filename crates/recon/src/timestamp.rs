//! Timestamp coercion for milestone cells.
//!
//! Source sheets carry dates as native workbook date-times, as Excel serial
//! numbers, or as free text. Everything funnels through [`parse_text`] and
//! [`from_excel_serial`]; anything that does not parse is simply absent.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

fn excel_epoch() -> NaiveDateTime {
    // 1899-12-30 so that serial 1.0 lands on 1900-01-01 like Excel does.
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Parse a text cell. Day-first for slash/dash dates.
pub fn parse_text(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert an Excel serial (1900 date system) to a date-time.
///
/// The fractional part is the time of day, rounded to the millisecond.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(TimeDelta::milliseconds(millis))
}

/// Convert a date-time to an Excel serial (1900 date system).
pub fn to_excel_serial(ts: NaiveDateTime) -> f64 {
    (ts - excel_epoch()).num_milliseconds() as f64 / MILLIS_PER_DAY
}
