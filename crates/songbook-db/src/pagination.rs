//! Page arithmetic for list responses. A pure function of the collection
//! size and the two query parameters; no cursor is stored.

use std::ops::Range;

pub const DEFAULT_PER_PAGE: usize = 50;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-indexed
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl Page {
    /// `page` is clamped to at least 1, `per_page` to `1..=MAX_PER_PAGE`.
    pub fn new(total: usize, page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
            total,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Index range of this page, empty once past the end.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset().min(self.total);
        let end = self.offset().saturating_add(self.per_page).min(self.total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range()]
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_mul(self.per_page) < self.total
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
