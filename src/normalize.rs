//! Cell-level coercion from CSV text to typed column values.
//!
//! The rule for a column follows from its [`ColumnKind`] plus the
//! `blank_as_empty` flag. Dates and timestamps coerce on error (unparseable
//! text becomes NULL); booleans always coerce; numeric and time cells that do
//! not parse are rejected so a bad export fails loudly instead of loading
//! shifted data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::Value;
use std::str::FromStr;

use crate::schema::{Column, ColumnKind};

/// Markers read as a missing value, the same set pandas' `read_csv` treats
/// as NA by default.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// How a column's cells are turned into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Parse as a date; unparseable → NULL.
    CoerceDate,
    /// Parse as a timestamp; unparseable → NULL.
    CoerceTimestamp,
    /// Parse as a UTC timestamp; unparseable → NULL.
    CoerceTimestampTz,
    CoerceBool,
    /// Missing or empty → `""`, never NULL.
    BlankAsEmpty,
    Text,
    Integer,
    Float,
    Decimal,
    Time,
}

impl Rule {
    pub fn for_column(column: &Column) -> Self {
        if column.blank_as_empty && column.kind.is_textual() {
            return Rule::BlankAsEmpty;
        }
        match column.kind {
            ColumnKind::Date => Rule::CoerceDate,
            ColumnKind::Timestamp => Rule::CoerceTimestamp,
            ColumnKind::TimestampTz => Rule::CoerceTimestampTz,
            ColumnKind::Boolean => Rule::CoerceBool,
            ColumnKind::Integer => Rule::Integer,
            ColumnKind::Float => Rule::Float,
            ColumnKind::Decimal(..) => Rule::Decimal,
            ColumnKind::Time => Rule::Time,
            // UUID keys are database-generated and never loaded from CSV.
            ColumnKind::Varchar(_) | ColumnKind::Text | ColumnKind::Uuid => Rule::Text,
        }
    }

    /// Whether the source file must carry this column. A coercion applied to
    /// a column the file does not have is an error, not a silent NULL.
    pub fn is_explicit(self) -> bool {
        matches!(
            self,
            Rule::CoerceDate
                | Rule::CoerceTimestamp
                | Rule::CoerceTimestampTz
                | Rule::CoerceBool
                | Rule::BlankAsEmpty
        )
    }
}

/// A cell that could not be converted to its column's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCell;

/// Converts one raw CSV cell into the value bound for its column.
pub fn normalize_cell(column: &Column, raw: &str) -> Result<Value, InvalidCell> {
    let rule = Rule::for_column(column);
    let missing = is_missing(raw);
    let trimmed = raw.trim();

    let value: Value = match rule {
        Rule::CoerceDate => parse_date(trimmed).into(),
        Rule::CoerceTimestamp => parse_timestamp(trimmed).into(),
        Rule::CoerceTimestampTz => parse_timestamp_utc(trimmed).into(),
        Rule::CoerceBool => coerce_bool(raw).into(),
        Rule::BlankAsEmpty if missing => String::new().into(),
        Rule::BlankAsEmpty => raw.to_string().into(),
        Rule::Text if missing => None::<String>.into(),
        Rule::Text => Some(raw.to_string()).into(),
        Rule::Integer if missing => None::<i32>.into(),
        Rule::Integer => Some(parse_integer(trimmed).ok_or(InvalidCell)?).into(),
        Rule::Float if missing => None::<f64>.into(),
        Rule::Float => Some(parse_float(trimmed).ok_or(InvalidCell)?).into(),
        Rule::Decimal if missing => None::<Decimal>.into(),
        Rule::Decimal => Some(parse_decimal(trimmed).ok_or(InvalidCell)?).into(),
        Rule::Time if missing => None::<NaiveTime>.into(),
        Rule::Time => Some(parse_time(trimmed).ok_or(InvalidCell)?).into(),
    };
    Ok(value)
}

pub fn is_missing(raw: &str) -> bool {
    MISSING_MARKERS.contains(&raw.trim())
}

/// Lenient date parse. Timestamps keep their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if is_missing(raw) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date()))
}

/// Lenient timestamp parse. Dates read as midnight; offsets convert to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if is_missing(raw) {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn parse_timestamp_utc(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(raw).map(|naive| naive.and_utc())
}

/// Case-insensitive boolean coercion. Empty cells are false; unknown
/// non-empty text is true.
///
/// Unlike a plain truthiness cast, `"no"`/`"false"` and NA markers read as false.
pub fn coerce_bool(raw: &str) -> bool {
    let token = raw.trim().to_ascii_lowercase();
    match token.as_str() {
        "true" | "t" | "yes" | "y" | "1" => true,
        "false" | "f" | "no" | "n" | "0" => false,
        _ if is_missing(&token) => false,
        _ => match token.parse::<f64>() {
            Ok(n) => n != 0.0,
            Err(_) => true,
        },
    }
}

/// Integers, also accepting integral float text such as `12.0`.
pub fn parse_integer(raw: &str) -> Option<i32> {
    if let Ok(n) = raw.parse::<i32>() {
        return Some(n);
    }
    let float = raw.parse::<f64>().ok()?;
    let in_range = float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX);
    if float.fract() == 0.0 && in_range {
        Some(float as i32)
    } else {
        None
    }
}

pub fn parse_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}
