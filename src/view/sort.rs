use serde::{Deserialize, Serialize};

use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort control shared by every sortable column header of a table. At most
/// one column is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    active: Option<(String, SortDirection)>,
}

impl SortState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            active: Some((column.into(), direction)),
        }
    }

    /// Header click: `none → ascending → descending → none` on the same
    /// column; a different column starts over at ascending.
    pub fn toggle(&mut self, column: &str) {
        self.active = match self.active.take() {
            Some((current, SortDirection::Ascending)) if current == column => {
                Some((current, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == column => None,
            _ => Some((column.to_string(), SortDirection::Ascending)),
        };
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn column(&self) -> Option<&str> {
        self.active.as_ref().map(|(column, _)| column.as_str())
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.as_ref().map(|(_, direction)| *direction)
    }

    /// Direction shown on `column`'s header, if it is the active one.
    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        match &self.active {
            Some((current, direction)) if current == column => Some(*direction),
            _ => None,
        }
    }
}

/// Orders `rows` in place. Stable: rows with equal keys keep their relative
/// order. With no active column the record type's default order applies.
pub fn sort_rows<R: Record>(rows: &mut [&R], state: &SortState) {
    match &state.active {
        None => rows.sort_by(|a, b| R::default_order(a, b)),
        Some((column, SortDirection::Ascending)) => {
            rows.sort_by(|a, b| a.field(column).compare(&b.field(column)))
        }
        Some((column, SortDirection::Descending)) => {
            rows.sort_by(|a, b| b.field(column).compare(&a.field(column)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_column_cycles_through_three_states() {
        let mut state = SortState::none();
        state.toggle("quantityLiters");
        assert_eq!(state.direction_for("quantityLiters"), Some(SortDirection::Ascending));
        state.toggle("quantityLiters");
        assert_eq!(state.direction_for("quantityLiters"), Some(SortDirection::Descending));
        state.toggle("quantityLiters");
        assert_eq!(state, SortState::none());
    }

    #[test]
    fn other_column_resets_to_ascending() {
        let mut state = SortState::by("date", SortDirection::Descending);
        state.toggle("quantityLiters");
        assert_eq!(state.column(), Some("quantityLiters"));
        assert_eq!(state.direction(), Some(SortDirection::Ascending));
        assert_eq!(state.direction_for("date"), None);
    }
}
