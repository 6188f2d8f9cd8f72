//! # Pagination
//!
//! Paging of lists that are already in memory.

use crate::OakhurstError;

/// One page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Items on this page.
    pub items: &'a [T],
    /// 1-based page number actually shown (after clamping).
    pub page: usize,
    /// Requested page size.
    pub per_page: usize,
    /// Total number of pages; at least 1.
    pub total_pages: usize,
    /// Number of items across all pages.
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 1-based position of the first item on this page, 0 when empty.
    #[must_use]
    pub fn first_item_number(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based position of the last item on this page, 0 when empty.
    #[must_use]
    pub fn last_item_number(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + self.items.len()
        }
    }
}

/// Cut `items` into pages of `per_page` and return page `page` (1-based).
///
/// Page numbers below 1 show the first page; numbers past the end show the
/// last page.
pub fn paginate<T>(
    items: &[T],
    page: usize,
    per_page: usize,
) -> Result<Page<'_, T>, OakhurstError> {
    if per_page == 0 {
        return Err(OakhurstError::invalid_input("per_page", "must be at least 1"));
    }
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);
    Ok(Page {
        items: &items[start..end],
        page,
        per_page,
        total_pages,
        total_items,
    })
}

// =============================================================================
// TESTS
// =============================================================================
