//! Line parser for tab-delimited daily observation records
//!
//! Each line carries four tab-separated fields: a `YYYYMMDD` date,
//! max temperature in tenths of a degree, min temperature in tenths of a
//! degree, and precipitation in hundredths of a millimeter.

use chrono::NaiveDate;

use crate::types::DailyObservation;
use crate::units::{hundredths_to_cm, tenths_to_degrees};

/// Rejection reasons for a single raw line.
///
/// A rejection never aborts the caller; each line stands on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 4 tab-separated fields, got {0}")]
    FieldCount(usize),

    #[error("invalid date {0:?}, expected YYYYMMDD")]
    InvalidDate(String),

    #[error("invalid numeric field {0:?}")]
    InvalidNumber(String),
}

/// Parse one raw line into a typed observation.
pub fn parse_line(line: &str) -> Result<DailyObservation, ParseError> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() != 4 {
        return Err(ParseError::FieldCount(fields.len()));
    }

    let date = NaiveDate::parse_from_str(fields[0], "%Y%m%d")
        .map_err(|_| ParseError::InvalidDate(fields[0].to_string()))?;
    let max_temp = parse_raw(fields[1])?;
    let min_temp = parse_raw(fields[2])?;
    let precipitation = parse_raw(fields[3])?;

    Ok(DailyObservation {
        date,
        max_temp: tenths_to_degrees(max_temp),
        min_temp: tenths_to_degrees(min_temp),
        precipitation: hundredths_to_cm(precipitation),
    })
}

fn parse_raw(field: &str) -> Result<i64, ParseError> {
    field
        .parse()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}
