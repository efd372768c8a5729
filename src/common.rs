/// Common types and utilities shared across models, views and commands
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date range bounds as typed into the filter bar.
///
/// Both bounds are raw strings; a blank bound is inactive. Parsing happens
/// lazily through [`DateRange::bounds`] so a malformed value never fails the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// A single parsed date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Inactive,
    Valid(NaiveDate),
    Invalid,
}

impl DateBound {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => DateBound::Inactive,
            Some(value) => parse_calendar_date(value)
                .map(DateBound::Valid)
                .unwrap_or(DateBound::Invalid),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DateBound::Inactive)
    }
}

impl DateRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    pub fn bounds(&self) -> (DateBound, DateBound) {
        (
            DateBound::parse(self.from.as_deref()),
            DateBound::parse(self.to.as_deref()),
        )
    }

    pub fn is_active(&self) -> bool {
        let (from, to) = self.bounds();
        from.is_active() || to.is_active()
    }

    /// Inclusive containment check. A missing date never matches an active
    /// range, and neither does anything when a bound failed to parse.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let (from, to) = self.bounds();
        if !from.is_active() && !to.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        let lower_ok = match from {
            DateBound::Inactive => true,
            DateBound::Valid(bound) => date >= bound,
            DateBound::Invalid => false,
        };
        let upper_ok = match to {
            DateBound::Inactive => true,
            DateBound::Valid(bound) => date <= bound,
            DateBound::Invalid => false,
        };
        lower_ok && upper_ok
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses `YYYY-MM-DD`, RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` string
/// into a calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_instant(raw).map(|instant| instant.date_naive())
}

/// Parses a date or timestamp string into a UTC instant. Plain dates resolve
/// to midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Generates a fresh record identifier such as `SL-3f1c...`.
pub fn new_record_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
