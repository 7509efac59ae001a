//! Date/time helpers for prompt augmentation and live-event timestamps.
//!
//! Every value derived for a single request comes from one timestamp read,
//! so weekday, date and time can never disagree with each other.

use crate::error::RelayError;
use chrono::{DateTime, Datelike, Weekday};
use chrono_tz::Tz;

/// Format used for live-event timestamps.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an IANA timezone name (e.g. "America/Santiago").
pub fn parse_timezone(name: &str) -> Result<Tz, RelayError> {
    name.parse::<Tz>()
        .map_err(|e| RelayError::Config(format!("invalid timezone '{name}': {e}")))
}

/// Spanish name of a weekday.
pub fn weekday_es(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Append the current weekday, date and time to a fetched context string.
pub fn system_context(context: &str, now: &DateTime<Tz>, location_label: &str) -> String {
    format!(
        "{context}\nHoy es {}. La fecha actual es: {}. La hora actual en {location_label} es: {}.",
        weekday_es(now.weekday()),
        now.format("%d-%m-%y"),
        now.format("%H:%M"),
    )
}

/// Timestamp string for a live event.
pub fn event_timestamp(now: &DateTime<Tz>) -> String {
    now.format(EVENT_TIMESTAMP_FORMAT).to_string()
}
