//! Best-effort date parsing for date and datetime literals.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::error::{QueryError, Result};

/// Format used for DATE literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for DATETIME literals.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Input accepted by the date converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// The current time, from the driver clock when one is attached.
    Now,
    /// Seconds since the Unix epoch.
    Timestamp(i64),
    /// A numeric string or a free-form date string.
    Text(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A date and time.
    DateTime(NaiveDateTime),
}

impl DateInput {
    /// Resolves the input to a concrete date and time.
    ///
    /// `now` is only called for [`DateInput::Now`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] if text cannot be parsed or a
    /// timestamp is out of range.
    pub fn resolve<F>(self, now: F) -> Result<NaiveDateTime>
    where
        F: FnOnce() -> Result<NaiveDateTime>,
    {
        match self {
            Self::Now => now(),
            Self::Timestamp(ts) => from_timestamp(ts),
            Self::Text(text) => parse_date_time(&text),
            Self::Date(date) => Ok(date.and_time(NaiveTime::MIN)),
            Self::DateTime(dt) => Ok(dt),
        }
    }
}

impl From<i64> for DateInput {
    fn from(ts: i64) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::DateTime(dt.naive_utc())
    }
}

/// Parses a numeric timestamp or a date string in one of the common layouts.
///
/// Zoned inputs (RFC 3339, RFC 2822) are normalized to UTC.
///
/// # Errors
///
/// Returns [`QueryError::InvalidDate`] if no layout matches.
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(ts) = text.parse::<i64>() {
        return from_timestamp(ts);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    Err(QueryError::InvalidDate(text.to_string()))
}

fn from_timestamp(ts: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| QueryError::InvalidDate(ts.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(dt: NaiveDateTime) -> String {
        dt.format(DATE_TIME_FORMAT).to_string()
    }

    #[test]
    fn test_parse_common_layouts() {
        let expected = "2016-07-22 13:54:09";
        assert_eq!(fmt(parse_date_time("2016-07-22 13:54:09").unwrap()), expected);
        assert_eq!(fmt(parse_date_time("2016-07-22T13:54:09").unwrap()), expected);
        assert_eq!(fmt(parse_date_time("2016-07-22T13:54:09Z").unwrap()), expected);
        assert_eq!(
            fmt(parse_date_time("2016-07-22").unwrap()),
            "2016-07-22 00:00:00"
        );
        assert_eq!(
            fmt(parse_date_time("22.07.2016").unwrap()),
            "2016-07-22 00:00:00"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            fmt(parse_date_time("1469195649").unwrap()),
            "2016-07-22 13:54:09"
        );
        assert_eq!(
            fmt(DateInput::Timestamp(0).resolve(|| unreachable!()).unwrap()),
            "1970-01-01 00:00:00"
        );
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_date_time("not a date").unwrap_err();
        assert!(matches!(err, QueryError::InvalidDate(_)));
    }

    #[test]
    fn test_now_uses_clock() {
        let fixed = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(DateInput::Now.resolve(|| Ok(fixed)).unwrap(), fixed);
    }
}
