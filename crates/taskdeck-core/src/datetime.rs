//! Conversions between date-time input strings and `NaiveDateTime`.
//!
//! Inputs come from date-time pickers at minute precision
//! (`2025-03-14T09:15`). The service expects second precision
//! (`2025-03-14T09:15:00`).

use chrono::NaiveDateTime;

use crate::TaskdeckError;

pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a raw input value. Blank input means "no value".
pub fn parse_input(raw: &str) -> Result<Option<NaiveDateTime>, TaskdeckError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(raw, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, WIRE_FORMAT))
        .map(Some)
        .map_err(|_| TaskdeckError::InvalidInput(format!("not a date-time: {raw}")))
}

/// Minute-precision value suitable for pre-filling an input.
pub fn to_input(dt: &NaiveDateTime) -> String {
    dt.format(INPUT_FORMAT).to_string()
}

pub fn to_wire(dt: &NaiveDateTime) -> String {
    dt.format(WIRE_FORMAT).to_string()
}
