//! Per-field value converters.
//!
//! A converter owns the wire representation of one field in both
//! directions, bypassing the built-in scalar and sequence handling. Bind one
//! with [`FieldAttributes::with_converter`](crate::FieldAttributes::with_converter).
//!
//! The encoder writes converter output without escaping commas, so a
//! converter may produce delimited text.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_form::{form_record, from_str, to_string, FieldAttributes, FnConverter, FormValue, Number};
//!
//! #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
//! struct Paint { color: u32 }
//!
//! form_record!(Paint {
//!     "color" => FieldAttributes::new().with_converter(FnConverter::new(
//!         |value| Ok(format!("{:06X}", value.as_number().and_then(Number::as_u64).unwrap_or(0))),
//!         |text| u32::from_str_radix(text, 16)
//!             .map(FormValue::from)
//!             .map_err(serde_form::Error::custom),
//!     )),
//! });
//!
//! let wire = to_string(&Paint { color: 0xFF8800 }).unwrap();
//! assert_eq!(wire, "color=FF8800");
//! assert_eq!(from_str::<Paint>(&wire).unwrap(), Paint { color: 0xFF8800 });
//! ```

use crate::{Error, FormValue, Number, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// A bidirectional mapping between a field value and its wire text.
pub trait ValueConverter: Send + Sync {
    /// Renders the field value as unencoded wire text.
    fn to_form_string(&self, value: &FormValue) -> Result<String>;

    /// Parses decoded wire text into a value for the field.
    ///
    /// A returned [`FormValue::String`] is coerced into the field's type the
    /// same way a plain wire value is.
    fn from_form_string(&self, text: &str) -> Result<FormValue>;
}

type ToFn = dyn Fn(&FormValue) -> Result<String> + Send + Sync;
type FromFn = dyn Fn(&str) -> Result<FormValue> + Send + Sync;

/// A converter built from a pair of closures.
pub struct FnConverter {
    to: Box<ToFn>,
    from: Box<FromFn>,
}

impl FnConverter {
    pub fn new<T, F>(to: T, from: F) -> Self
    where
        T: Fn(&FormValue) -> Result<String> + Send + Sync + 'static,
        F: Fn(&str) -> Result<FormValue> + Send + Sync + 'static,
    {
        FnConverter {
            to: Box::new(to),
            from: Box::new(from),
        }
    }
}

impl ValueConverter for FnConverter {
    fn to_form_string(&self, value: &FormValue) -> Result<String> {
        (self.to)(value)
    }

    fn from_form_string(&self, text: &str) -> Result<FormValue> {
        (self.from)(text)
    }
}

/// Writes `chrono` date-times as RFC 3339 / ISO 8601 text, keeping the offset.
///
/// Offset-less input (`2024-05-01T10:00:00`) stays offset-less, so the
/// converter serves `NaiveDateTime` fields as well as `DateTime<Tz>` ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct Iso8601Converter;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl ValueConverter for Iso8601Converter {
    fn to_form_string(&self, value: &FormValue) -> Result<String> {
        match value {
            FormValue::String(text) => normalize_iso8601(text)
                .ok_or_else(|| Error::custom(format!("'{}' is not an ISO 8601 date-time", text))),
            other => {
                let dt = date_time_from_value(other)?;
                Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }

    fn from_form_string(&self, text: &str) -> Result<FormValue> {
        normalize_iso8601(text)
            .map(FormValue::String)
            .ok_or_else(|| Error::custom("expected an ISO 8601 date-time"))
    }
}

/// Re-renders date-time text, with an offset only if the input carried one.
fn normalize_iso8601(text: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }
    let naive = NaiveDateTime::parse_from_str(text, NAIVE_FORMAT).ok()?;
    Some(naive.format(NAIVE_FORMAT).to_string())
}

/// Writes `chrono` date-times as ticks: 100-nanosecond intervals since
/// 0001-01-01T00:00:00Z.
///
/// Ticks count the UTC instant. Systems that count ticks of the local clock
/// time instead, such as .NET's `DateTimeOffset.Ticks`, write values that
/// differ by the offset for date-times outside UTC. Decoded ticks come back
/// as UTC text, so the field must be a `DateTime<Tz>`; offset-less input is
/// read as UTC when encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicksConverter;

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
/// Ticks between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

impl TicksConverter {
    /// Converts a date-time into ticks of its UTC instant, or `None` when
    /// out of range.
    #[must_use]
    pub fn to_ticks<Tz: TimeZone>(dt: &DateTime<Tz>) -> Option<i64> {
        dt.timestamp()
            .checked_mul(TICKS_PER_SECOND)?
            .checked_add(i64::from(dt.timestamp_subsec_nanos()) / NANOS_PER_TICK)?
            .checked_add(UNIX_EPOCH_TICKS)
    }

    /// Converts ticks into a UTC date-time, or `None` when out of range.
    #[must_use]
    pub fn from_ticks(ticks: i64) -> Option<DateTime<Utc>> {
        let unix_ticks = ticks.checked_sub(UNIX_EPOCH_TICKS)?;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = u32::try_from(unix_ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK).ok()?;
        Utc.timestamp_opt(secs, nanos).single()
    }
}

impl ValueConverter for TicksConverter {
    fn to_form_string(&self, value: &FormValue) -> Result<String> {
        let dt = date_time_from_value(value)?;
        Self::to_ticks(&dt)
            .map(|ticks| ticks.to_string())
            .ok_or_else(|| Error::custom("date-time is out of range for ticks"))
    }

    fn from_form_string(&self, text: &str) -> Result<FormValue> {
        let ticks: i64 = text.parse().map_err(Error::custom)?;
        let dt = Self::from_ticks(ticks)
            .ok_or_else(|| Error::custom("ticks are out of range for a date-time"))?;
        Ok(FormValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

fn date_time_from_value(value: &FormValue) -> Result<DateTime<FixedOffset>> {
    match value {
        FormValue::String(text) => parse_date_time(text)
            .ok_or_else(|| Error::custom(format!("'{}' is not an ISO 8601 date-time", text))),
        FormValue::Number(Number::Integer(secs)) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| Error::custom("timestamp is out of range")),
        other => Err(Error::custom(format!(
            "expected a date-time, found {:?}",
            other
        ))),
    }
}

fn parse_date_time(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    let naive = NaiveDateTime::parse_from_str(text, NAIVE_FORMAT).ok()?;
    Some(FixedOffset::east_opt(0)?.from_utc_datetime(&naive))
}
