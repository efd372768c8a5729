use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::common::DateRange;
use crate::models::Record;

/// Column filter value meaning "no filter", as used by the drop-downs.
pub const FILTER_ALL: &str = "all";

/// Current state of a page's filter bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    /// Column name to selected value; [`FILTER_ALL`] or blank is inactive.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub date_range: DateRange,
}

fn is_active_value(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != FILTER_ALL
}

impl FilterState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_column(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    /// Normalized search needle; `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    pub fn active_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .filter(|(_, value)| is_active_value(value))
            .map(|(column, value)| (column.as_str(), value.trim()))
    }

    pub fn is_column_active(&self, column: &str) -> bool {
        self.columns
            .get(column)
            .map(|value| is_active_value(value))
            .unwrap_or(false)
    }

    pub fn is_active(&self) -> bool {
        self.search_term().is_some()
            || self.active_columns().next().is_some()
            || self.date_range.is_active()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        CompiledFilter::new(self).matches(record)
    }
}

/// Filter state with the search needle and active predicates resolved once
/// per derivation rather than once per row.
struct CompiledFilter<'a> {
    search: Option<String>,
    columns: Vec<(&'a str, &'a str)>,
    date_range: Option<&'a DateRange>,
}

impl<'a> CompiledFilter<'a> {
    fn new(state: &'a FilterState) -> Self {
        Self {
            search: state.search_term(),
            columns: state.active_columns().collect(),
            date_range: state
                .date_range
                .is_active()
                .then_some(&state.date_range),
        }
    }

    fn matches_search<R: Record>(&self, record: &R) -> bool {
        let Some(needle) = &self.search else {
            return true;
        };
        R::search_columns().iter().any(|column| {
            record
                .field(column)
                .display()
                .to_lowercase()
                .contains(needle.as_str())
        })
    }

    fn matches_columns<R: Record>(&self, record: &R) -> bool {
        self.columns
            .iter()
            .all(|(column, expected)| record.field(column).display() == *expected)
    }

    fn matches_dates<R: Record>(&self, record: &R) -> bool {
        match self.date_range {
            None => true,
            Some(range) => range.contains(record.field(R::date_column()).calendar_date()),
        }
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        self.matches_search(record) && self.matches_columns(record) && self.matches_dates(record)
    }
}

/// Rows of `records` matching every active predicate, in input order.
pub fn apply_filters<'a, R: Record>(records: &'a [R], state: &FilterState) -> Vec<&'a R> {
    let compiled = CompiledFilter::new(state);
    records
        .iter()
        .filter(|record| compiled.matches(*record))
        .collect()
}

/// Sorted distinct non-empty values of `column`, for populating a filter
/// drop-down.
pub fn column_options<R: Record>(records: &[R], column: &str) -> Vec<String> {
    records
        .iter()
        .map(|record| record.field(column).display().into_owned())
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
