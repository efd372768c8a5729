use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::common::{parse_calendar_date, parse_instant};

pub mod delivery;
pub mod fund;
pub mod reference;
pub mod sales;

/// Column name every record exposes for its creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Typed view of one record column, used by filtering, sorting and table
/// rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(Decimal),
    /// A date kept as the raw string the record stores.
    Date(Cow<'a, str>),
    Timestamp(DateTime<Utc>),
    Missing,
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }

    pub fn tag(value: impl ToString) -> Self {
        FieldValue::Text(Cow::Owned(value.to_string()))
    }

    pub fn date(value: &'a str) -> Self {
        FieldValue::Date(Cow::Borrowed(value))
    }

    pub fn optional_text(value: Option<&'a str>) -> Self {
        value.map(FieldValue::text).unwrap_or(FieldValue::Missing)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Text form used for search, column filters and fallback comparison.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(value) | FieldValue::Date(value) => Cow::Borrowed(value.as_ref()),
            FieldValue::Number(value) => Cow::Owned(value.normalize().to_string()),
            FieldValue::Timestamp(value) => Cow::Owned(value.to_rfc3339()),
            FieldValue::Missing => Cow::Borrowed(""),
        }
    }

    /// Milliseconds since the epoch for date-like values.
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            FieldValue::Date(raw) => parse_instant(raw).map(|instant| instant.timestamp_millis()),
            FieldValue::Timestamp(value) => Some(value.timestamp_millis()),
            _ => None,
        }
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(raw) => parse_calendar_date(raw),
            FieldValue::Timestamp(value) => Some(value.date_naive()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn is_date_like(&self) -> bool {
        matches!(self, FieldValue::Date(_) | FieldValue::Timestamp(_))
    }

    /// Natural ordering: numbers numerically, dates by epoch milliseconds,
    /// text lexicographically. `Missing` and unparseable dates order first.
    /// Values of different kinds compare by their text form.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
            (FieldValue::Missing, _) => Ordering::Less,
            (_, FieldValue::Missing) => Ordering::Greater,
            (FieldValue::Number(a), FieldValue::Number(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (a, b) if a.is_date_like() && b.is_date_like() => a.epoch_millis().cmp(&b.epoch_millis()),
            (a, b) => a.display().cmp(&b.display()),
        }
    }
}

/// A row in one of the back-office collections.
pub trait Record: Clone + Serialize + DeserializeOwned + 'static {
    /// Versioned persistence key, e.g. `ptt.delivery.suctionLogs.v1`.
    const COLLECTION_KEY: &'static str;

    /// Prefix for generated identifiers.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Typed access to a column by its camelCase name. Unknown columns are
    /// `Missing`.
    fn field(&self, column: &str) -> FieldValue<'_>;

    /// Columns scanned by free-text search.
    fn search_columns() -> &'static [&'static str];

    /// Column used by date-range filtering.
    fn date_column() -> &'static str {
        CREATED_AT
    }

    /// Order used when no sort column is active: newest first.
    fn default_order(a: &Self, b: &Self) -> Ordering {
        b.created_at().cmp(&a.created_at())
    }
}
