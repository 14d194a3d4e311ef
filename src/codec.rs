//! Cell value codec
//!
//! Write side: typed [`CellValue`] → ([`CellKind`], text).
//! Read side: cell text → typed [`CellValue`] for a declared [`ValueType`];
//! numeric cells bound to date fields are read as date serials.
//!
//! All text is culture-invariant: `.` decimal separator, no grouping, dates
//! as RFC 3339 UTC with nanosecond precision.

use crate::error::ConversionError;
use crate::types::{Cell, CellKind, CellValue, ValueType};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

//==============================================================================
// Encode
//==============================================================================

/// Encode a value into the cell written to the sheet
pub fn encode(value: &CellValue) -> Cell {
    match value {
        CellValue::Null => Cell::empty(),
        CellValue::Int(i) => Cell::new(CellKind::Number, i.to_string()),
        // A numeric cell cannot hold NaN or infinities
        CellValue::Float(f) if !f.is_finite() => Cell::text(f.to_string()),
        CellValue::Float(f) => Cell::new(CellKind::Number, f.to_string()),
        CellValue::Decimal(d) => Cell::new(CellKind::Number, d.to_string()),
        CellValue::Date(d) => Cell::new(CellKind::Date, format_datetime(&date_at_midnight(*d))),
        CellValue::DateTime(dt) => Cell::new(CellKind::Date, format_datetime(dt)),
        CellValue::Bool(b) => Cell::text(b.to_string()),
        CellValue::Text(s) => Cell::text(s.clone()),
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn date_at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

//==============================================================================
// Decode
//==============================================================================

/// Decode cell text into a value of the declared type
///
/// Empty text decodes to [`CellValue::Null`] for every type.
pub fn decode(text: &str, target: ValueType) -> Result<CellValue, ConversionError> {
    if text.is_empty() {
        return Ok(CellValue::Null);
    }

    let trimmed = text.trim();
    match target {
        ValueType::Integer => match trimmed.parse::<i64>() {
            Ok(i) => Ok(CellValue::Int(i)),
            // Unsigned values past i64::MAX travel as decimals
            Err(e) => trimmed
                .parse::<u64>()
                .map(|u| CellValue::Decimal(Decimal::from(u)))
                .map_err(|_| ConversionError::new(text, target, e.to_string())),
        },
        ValueType::Float => trimmed
            .parse::<f64>()
            .map(CellValue::Float)
            .map_err(|e| ConversionError::new(text, target, e.to_string())),
        ValueType::Decimal => Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(CellValue::Decimal)
            .map_err(|e| ConversionError::new(text, target, e.to_string())),
        ValueType::Boolean => parse_bool(trimmed)
            .map(CellValue::Bool)
            .ok_or_else(|| ConversionError::new(text, target, "expected true/false or 1/0")),
        ValueType::DateTime => parse_datetime(trimmed)
            .map(CellValue::DateTime)
            .ok_or_else(|| ConversionError::new(text, target, "unrecognized date/time format")),
        ValueType::Date => parse_datetime(trimmed)
            .map(|dt| CellValue::Date(dt.date_naive()))
            .ok_or_else(|| ConversionError::new(text, target, "unrecognized date format")),
        ValueType::Text => Ok(CellValue::Text(text.to_string())),
    }
}

/// Decode a cell read from a sheet
///
/// A numeric cell bound to a date field is read as a 1900-system serial.
/// Everything else goes through [`decode`]; text cells never yield serials.
pub fn decode_cell(cell: &Cell, target: ValueType) -> Result<CellValue, ConversionError> {
    let serial = match (cell.kind, target) {
        (CellKind::Number, ValueType::Date | ValueType::DateTime) => {
            cell.raw.trim().parse::<f64>().ok()
        }
        _ => None,
    };
    let Some(serial) = serial else {
        return decode(&cell.raw, target);
    };

    let dt = from_serial(serial)
        .ok_or_else(|| ConversionError::new(cell.raw.as_str(), target, "date serial out of range"))?;
    Ok(match target {
        ValueType::Date => CellValue::Date(dt.date_naive()),
        _ => CellValue::DateTime(dt),
    })
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(date_at_midnight)
}

/// Convert a 1900-system date serial (what spreadsheet applications store
/// for dates) to a UTC timestamp
fn from_serial(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || serial < 0.0 || serial >= 2_958_466.0 {
        return None;
    }
    // Serials from 61 on carry the phantom 1900-02-29
    let epoch = if serial >= 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    };
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    Some(date_at_midnight(epoch) + Duration::milliseconds(millis))
}

//==============================================================================
// Shared strings
//==============================================================================

/// Resolve a shared-string cell's value against the table
///
/// An out-of-range index yields empty text; a value that is not an index at
/// all is passed through unchanged.
pub fn resolve_shared_string(raw: &str, table: &[String]) -> String {
    match raw.trim().parse::<usize>() {
        Ok(index) => table.get(index).cloned().unwrap_or_default(),
        Err(_) => raw.to_string(),
    }
}
