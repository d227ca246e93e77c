//! Calendar date wire format.
//!
//! Dates travel as `YYYY-MM-DD`. Clients that send a full timestamp
//! (`2024-03-01T00:00:00.000Z`) have the time part dropped, and an empty
//! string stands for "no date" on optional fields.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serializer};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a wire date.
pub fn parse_date(value: &str) -> Result<Date> {
    let value = value.trim();
    let date_part = match value.split_once('T') {
        Some((date, _)) => date,
        None => value,
    };
    Date::parse(date_part, DATE_FORMAT).map_err(|e| Error::InvalidDate(format!("{value:?}: {e}")))
}

/// Format a date for the wire.
pub fn format_date(date: Date) -> String {
    // The format has no fallible components for in-range dates.
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Deserialize a required date.
pub fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Deserialize an optional date, treating `null` and `""` as absent.
pub fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Serialize a date as `YYYY-MM-DD`.
pub fn serialize_date<S>(date: &Date, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_date(*date))
}

/// Serialize an optional date as `YYYY-MM-DD` or `null`.
pub fn serialize_optional_date<S>(
    date: &Option<Date>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}
