//! Grid view state: filters, search term, sort and pagination
//!
//! `GridState` never changes in place. Each transition borrows the current
//! value and returns the next one, so a caller can diff old and new (for
//! example to emit `PageChanged`) and the pipeline always sees a consistent
//! snapshot.

use serde::{Deserialize, Serialize};

use gridkit_core::{ColumnSet, Row};

use crate::pagination::PaginationState;
use crate::pipeline::{self, FilterState, Pagination, PipelineOutput, SortDirection, SortState};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridState {
    pub filters: FilterState,
    pub search_term: String,
    pub sort: SortState,
    pub pagination: PaginationState,
    /// Host-managed total for server-side paging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_override: Option<usize>,
}

impl GridState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: PaginationState::new(page_size),
            ..Default::default()
        }
    }

    /// Set one column filter; any filter change returns to page 1
    #[must_use]
    pub fn with_filter(&self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.filters.set(field, value);
        next.pagination = next.pagination.first();
        next
    }

    #[must_use]
    pub fn with_filters_cleared(&self) -> Self {
        let mut next = self.clone();
        next.filters.clear();
        next.pagination = next.pagination.first();
        next
    }

    /// Replace the search term; returns to page 1
    #[must_use]
    pub fn with_search(&self, term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            pagination: self.pagination.first(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_sort(&self, sort: SortState) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Header-click cycle: a new key sorts ascending, then descending, then off
    #[must_use]
    pub fn with_sort_toggled(&self, field: &str) -> Self {
        let sort = match (&self.sort.key, self.sort.direction) {
            (Some(key), SortDirection::Ascending) if key == field => {
                SortState::by(field, SortDirection::Descending)
            }
            (Some(key), SortDirection::Descending) if key == field => SortState::none(),
            _ => SortState::by(field, SortDirection::Ascending),
        };
        self.with_sort(sort)
    }

    #[must_use]
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            pagination: self.pagination.with_page(page),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_page_size(&self, page_size: usize) -> Self {
        Self {
            pagination: self.pagination.with_page_size(page_size),
            ..self.clone()
        }
    }

    /// Use a host-supplied total instead of counting filtered rows
    #[must_use]
    pub fn with_total_override(&self, total: Option<usize>) -> Self {
        let mut next = Self {
            total_override: total,
            ..self.clone()
        };
        if let Some(total) = total {
            next.pagination = next.pagination.with_total(total);
        }
        next
    }

    /// The page request handed to the pipeline
    pub fn page_request(&self) -> Pagination {
        let request = Pagination::new(self.pagination.page, self.pagination.page_size);
        match self.total_override {
            Some(total) => request.with_total_override(total),
            None => request,
        }
    }

    /// Run the pipeline and return the state with its total brought up to date
    ///
    /// The page is clamped to the new total before slicing, so a shrinking
    /// result never leaves the grid on an empty page past the end.
    pub fn evaluate<'a>(&self, rows: &'a [Row], columns: &ColumnSet) -> (Self, PipelineOutput<'a>) {
        let unpaged = pipeline::apply(rows, columns, &self.filters, &self.search_term, &self.sort, None);
        let total = self.total_override.unwrap_or(unpaged.total);

        let next = Self {
            pagination: self.pagination.with_total(total),
            ..self.clone()
        };
        let output = pipeline::paginate(unpaged.window, Some(&next.page_request()));
        (next, output)
    }
}
