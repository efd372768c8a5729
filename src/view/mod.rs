//! The tabular view engine: raw collection → filter → sort → rows for the
//! table and the summary cards.

use serde::{Deserialize, Serialize};

use crate::common::DateRange;
use crate::models::Record;

pub mod filter;
pub mod sort;
pub mod summary;
pub mod table;

pub use filter::{apply_filters, column_options, FilterState, FILTER_ALL};
pub use sort::{sort_rows, SortDirection, SortState};
pub use table::{ColumnKind, ColumnSpec, TableRenderer};

/// Rows currently visible in a table, borrowed from the owning collection.
#[derive(Debug)]
pub struct DerivedView<'a, R> {
    pub rows: Vec<&'a R>,
    /// Size of the unfiltered collection.
    pub total: usize,
}

impl<'a, R> DerivedView<'a, R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a str>
    where
        R: Record,
    {
        self.rows.iter().map(|&row| row.id()).collect()
    }
}

/// UI state of one table: the filter bar plus the sort control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub filter: FilterState,
    pub sort: SortState,
}

impl TableView {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_column_filter(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.filter.columns.insert(column.into(), value.into());
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.filter.date_range = range;
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
    }

    /// Recomputes the visible rows from scratch. Nothing is cached between
    /// calls, so edits to `records`, the filter or the sort always show.
    pub fn derive<'a, R: Record>(&self, records: &'a [R]) -> DerivedView<'a, R> {
        let mut rows = apply_filters(records, &self.filter);
        sort_rows(&mut rows, &self.sort);
        DerivedView {
            rows,
            total: records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::delivery::{SuctionLog, SuctionMode};
    use crate::models::reference::OilType;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn logs() -> Vec<SuctionLog> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        [(1200, SuctionMode::Sell), (300, SuctionMode::Suction), (300, SuctionMode::Sell)]
            .iter()
            .enumerate()
            .map(|(idx, (liters, mode))| SuctionLog {
                id: format!("SL-{}", idx + 1),
                created_at: base + Duration::minutes(idx as i64),
                updated_at: None,
                date: "2024-05-01".into(),
                branch_id: 1,
                oil_type: OilType::Diesel,
                mode: *mode,
                quantity_liters: Decimal::from(*liters),
                notes: None,
            })
            .collect()
    }

    #[test]
    fn default_order_is_newest_first() {
        let records = logs();
        let view = TableView::default().derive(&records);
        assert_eq!(view.ids(), vec!["SL-3", "SL-2", "SL-1"]);
        assert_eq!(view.total, 3);
    }

    #[test]
    fn ties_keep_prior_order_in_both_directions() {
        let records = logs();
        let mut table = TableView::default();
        table.toggle_sort("quantityLiters");
        assert_eq!(table.derive(&records).ids(), vec!["SL-2", "SL-3", "SL-1"]);
        table.toggle_sort("quantityLiters");
        assert_eq!(table.derive(&records).ids(), vec!["SL-1", "SL-2", "SL-3"]);
    }

    #[test]
    fn derivation_reflects_new_records() {
        let mut records = logs();
        let table = TableView::default();
        assert_eq!(table.derive(&records).len(), 3);
        records.pop();
        assert_eq!(table.derive(&records).len(), 2);
    }
}
