//! Database helper functions for safe type conversions.

use chrono::Weekday;
use rusqlite::types::Type;

/// Parse the JSON weekday list stored in `habits.custom_days`.
pub fn parse_weekdays(column: usize, s: &str) -> rusqlite::Result<Vec<Weekday>> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Read an INTEGER column written from a `u32`, rejecting negative values.
pub fn to_u32(column: usize, value: i64) -> rusqlite::Result<u32> {
    u32::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Integer, Box::new(e)))
}
