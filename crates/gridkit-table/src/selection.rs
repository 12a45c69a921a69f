//! Row selection across paginated views
//!
//! The selected set survives filter, sort and page changes. It is only
//! cleared by the host or by deselecting all; ids whose rows disappear from
//! the collection stay selected until then.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::Serialize;

use gridkit_core::{Row, RowId};

/// Aggregate selection reported to the host after every mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChange {
    pub selected_ids: Vec<RowId>,
    /// Resolved against the full row collection, not the visible window
    pub selected_rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: IndexSet<RowId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove one id; returns whether the set changed
    pub fn toggle(&mut self, id: RowId, checked: bool) -> bool {
        if checked {
            self.selected.insert(id)
        } else {
            self.selected.shift_remove(&id)
        }
    }

    /// Add or remove every id in the current display window
    pub fn select_all_visible<'a>(
        &mut self,
        window: impl IntoIterator<Item = &'a RowId>,
        checked: bool,
    ) -> bool {
        let mut changed = false;
        for id in window {
            changed |= self.toggle(id.clone(), checked);
        }
        changed
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.selected.iter()
    }

    /// Checked state of the select-all control: the current page only
    pub fn all_visible_selected<'a>(&self, window: impl IntoIterator<Item = &'a RowId>) -> bool {
        let mut any = false;
        for id in window {
            if !self.selected.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Indeterminate state of the select-all control
    pub fn some_visible_selected<'a>(&self, window: impl IntoIterator<Item = &'a RowId>) -> bool {
        let (mut selected, mut total) = (0usize, 0usize);
        for id in window {
            total += 1;
            if self.selected.contains(id) {
                selected += 1;
            }
        }
        selected > 0 && selected < total
    }

    /// Build the host notification, looking rows up in the full collection
    ///
    /// Ids with no matching row are still reported in `selected_ids`.
    pub fn change(&self, rows: &[Row]) -> SelectionChange {
        let by_id: HashMap<&RowId, &Row> = rows.iter().map(|row| (&row.id, row)).collect();
        SelectionChange {
            selected_ids: self.selected.iter().cloned().collect(),
            selected_rows: self
                .selected
                .iter()
                .filter_map(|id| by_id.get(id).map(|row| (*row).clone()))
                .collect(),
        }
    }
}
