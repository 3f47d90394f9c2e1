/// Shared types used across the codebase

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Calendar date wire format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("date must be in format YYYY-MM-DD")]
pub struct DateFormatError;

/// Parse an optional `YYYY-MM-DD` string. Absent input is not an error.
///
/// chrono tolerates unpadded fields and leading whitespace, so the parsed
/// date must format back to exactly the input.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, DateFormatError> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| DateFormatError)?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(DateFormatError);
    }
    Ok(Some(date))
}

/// Fresh externally visible identifier
pub fn new_public_id() -> Uuid {
    Uuid::new_v4()
}
