//! Pagination state
//!
//! Pages are 1-indexed. The state is a small `Copy` value: navigation returns a
//! new state instead of mutating in place, and callers compare old and new to
//! decide whether a page change happened.

use serde::{Deserialize, Serialize};

/// Page sizes offered by the page-size selector
pub const DEFAULT_PAGE_SIZE_OPTIONS: &[usize] = &[10, 20, 50, 100];

/// Default rows per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Total number of pages for `total` rows, never less than 1
pub fn total_pages(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    (total / page_size + usize::from(total % page_size != 0)).max(1)
}

/// `{page, pageSize, totalCount}` for one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Current page number (1-indexed)
    pub page: usize,
    pub page_size: usize,
    /// Row count after filter/search, or the host's server-side total
    pub total_count: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }

    /// Index of the first row on the current page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// Move to `page`, clamped to `1..=total_pages`
    #[must_use]
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.clamp(1, self.total_pages()),
            ..*self
        }
    }

    /// Change the page size, resetting to the first page
    #[must_use]
    pub fn with_page_size(&self, page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: self.total_count,
        }
    }

    /// Record a new total; the current page is clamped if the total shrank
    #[must_use]
    pub fn with_total(&self, total_count: usize) -> Self {
        let next = Self {
            total_count,
            ..*self
        };
        next.with_page(next.page)
    }

    #[must_use]
    pub fn next(&self) -> Self {
        self.with_page(self.page.saturating_add(1))
    }

    #[must_use]
    pub fn prev(&self) -> Self {
        self.with_page(self.page.saturating_sub(1))
    }

    #[must_use]
    pub fn first(&self) -> Self {
        self.with_page(1)
    }

    #[must_use]
    pub fn last(&self) -> Self {
        self.with_page(self.total_pages())
    }

    /// Absolute 1-based row number of the `index`-th row in the current window
    pub fn row_number(&self, index: usize) -> usize {
        self.offset() + index + 1
    }

    /// `"Showing a–b of n"`, or `"No rows"` when empty
    pub fn status_text(&self) -> String {
        if self.total_count == 0 {
            return "No rows".to_string();
        }
        let start = (self.offset() + 1).min(self.total_count);
        let end = (self.offset() + self.page_size).min(self.total_count);
        format!("Showing {}–{} of {}", start, end, self.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(5, 2), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
        assert_eq!(total_pages(usize::MAX, 10), usize::MAX / 10 + 1);
        assert_eq!(total_pages(usize::MAX, 1), usize::MAX);
        assert_eq!(total_pages(usize::MAX - 4, 5), usize::MAX / 5);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let state = PaginationState::new(10).with_total(35);
        assert_eq!(state.total_pages(), 4);
        assert!(!state.can_go_prev());
        assert!(state.can_go_next());

        let last = state.last();
        assert_eq!(last.page, 4);
        assert!(!last.can_go_next());
        assert_eq!(last.next().page, 4);
        assert_eq!(state.prev().page, 1);
        assert_eq!(state.with_page(99).page, 4);
        assert_eq!(state.with_page(0).page, 1);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let state = PaginationState::new(10).with_total(100).with_page(8);
        assert_eq!(state.with_total(25).page, 3);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let state = PaginationState::new(10).with_total(100).with_page(5);
        let resized = state.with_page_size(50);
        assert_eq!(resized.page, 1);
        assert_eq!(resized.total_pages(), 2);
    }

    #[test]
    fn test_status_text_and_row_numbers() {
        let state = PaginationState::new(20).with_total(45).with_page(3);
        assert_eq!(state.status_text(), "Showing 41–45 of 45");
        assert_eq!(state.row_number(0), 41);
        assert_eq!(PaginationState::default().status_text(), "No rows");
    }
}
