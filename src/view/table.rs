use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::format::{Formatter, PLACEHOLDER};
use crate::models::reference::{Labeled, LookupTable};
use crate::models::{FieldValue, Record};

use super::filter::FilterState;
use super::sort::{SortDirection, SortState};
use super::DerivedView;

/// How a column's cells are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number { decimals: u32 },
    Currency,
    Liters,
    Date,
    Timestamp,
    /// Resolved through a lookup registered on the renderer under the
    /// column key.
    Lookup,
}

impl ColumnKind {
    fn right_aligned(self) -> bool {
        matches!(
            self,
            ColumnKind::Number { .. } | ColumnKind::Currency | ColumnKind::Liters
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub filterable: bool,
}

impl ColumnSpec {
    pub const fn new(key: &'static str, label: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            label,
            kind,
            sortable: true,
            filterable: false,
        }
    }

    pub const fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// Resolves a raw key to a display label.
pub trait LabelLookup {
    fn resolve(&self, key: &str) -> Cow<'_, str>;
}

impl<T: Labeled> LabelLookup for LookupTable<T> {
    fn resolve(&self, key: &str) -> Cow<'_, str> {
        self.label_or_placeholder(key)
    }
}

/// Plain-text table renderer with sort and filter markers in the header.
pub struct TableRenderer<'a> {
    columns: &'a [ColumnSpec],
    formatter: &'a Formatter,
    lookups: BTreeMap<&'static str, &'a dyn LabelLookup>,
}

impl<'a> TableRenderer<'a> {
    pub fn new(columns: &'a [ColumnSpec], formatter: &'a Formatter) -> Self {
        Self {
            columns,
            formatter,
            lookups: BTreeMap::new(),
        }
    }

    pub fn with_lookup(mut self, column: &'static str, lookup: &'a dyn LabelLookup) -> Self {
        self.lookups.insert(column, lookup);
        self
    }

    pub fn header_label(&self, column: &ColumnSpec, sort: &SortState, filter: &FilterState) -> String {
        let mut label = column.label.to_string();
        if column.sortable {
            label.push_str(match sort.direction_for(column.key) {
                Some(SortDirection::Ascending) => " ▲",
                Some(SortDirection::Descending) => " ▼",
                None => "",
            });
        }
        if column.filterable && filter.is_column_active(column.key) {
            label.push_str(" *");
        }
        label
    }

    pub fn cell<R: Record>(&self, record: &R, column: &ColumnSpec) -> String {
        let value = record.field(column.key);
        if value.is_missing() {
            return PLACEHOLDER.to_string();
        }
        match column.kind {
            ColumnKind::Text => value.display().into_owned(),
            ColumnKind::Number { decimals } => self.number_or_text(&value, |n| {
                self.formatter.number(n, decimals)
            }),
            ColumnKind::Currency => self.number_or_text(&value, |n| self.formatter.currency(n)),
            ColumnKind::Liters => self.number_or_text(&value, |n| self.formatter.liters(n)),
            ColumnKind::Date => self.formatter.date(&value.display()),
            ColumnKind::Timestamp => match value {
                FieldValue::Timestamp(instant) => self.formatter.timestamp(&instant),
                other => self.formatter.timestamp_str(&other.display()),
            },
            ColumnKind::Lookup => match self.lookups.get(column.key) {
                Some(lookup) => lookup.resolve(&value.display()).into_owned(),
                None => value.display().into_owned(),
            },
        }
    }

    fn number_or_text(
        &self,
        value: &FieldValue<'_>,
        render: impl Fn(rust_decimal::Decimal) -> String,
    ) -> String {
        match value.as_number() {
            Some(number) => render(number),
            None => value.display().into_owned(),
        }
    }

    /// Renders the header, a rule, one line per row and a `n of total`
    /// footer.
    pub fn render<R: Record>(
        &self,
        view: &DerivedView<'_, R>,
        sort: &SortState,
        filter: &FilterState,
    ) -> String {
        let headers: Vec<String> = self
            .columns
            .iter()
            .map(|column| self.header_label(column, sort, filter))
            .collect();
        let body: Vec<Vec<String>> = view
            .rows
            .iter()
            .map(|row| self.columns.iter().map(|column| self.cell(*row, column)).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for line in &body {
            for (idx, cell) in line.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.line(&headers, &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
        for line in &body {
            out.push_str(&self.line(line, &widths));
            out.push('\n');
        }
        out.push_str(&format!("{} of {} rows", view.rows.len(), view.total));
        out
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(self.columns)
            .zip(widths)
            .map(|((cell, column), width)| {
                let pad = width.saturating_sub(cell.chars().count());
                if column.kind.right_aligned() {
                    format!("{}{}", " ".repeat(pad), cell)
                } else {
                    format!("{}{}", cell, " ".repeat(pad))
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }
}
