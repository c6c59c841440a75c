//! Pagination request and summary value objects.
//!
//! [`Page`] is a validated, request-scoped input value; [`PageInfo`] is the
//! derived read-only summary returned alongside a list result. Validating
//! bounds at construction keeps the zero-size divide out of the summary
//! computation entirely.

use serde::Serialize;
use thiserror::Error;

/// Errors returned while constructing a [`Page`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    /// The page number is below the 1-based minimum.
    #[error("page number must be at least 1, got {0}")]
    InvalidNumber(usize),

    /// The page size is outside the accepted range.
    #[error("page size must be between 1 and {max}, got {0}", max = Page::MAX_SIZE)]
    InvalidSize(usize),
}

/// Validated pagination request.
///
/// `number` is 1-based; `size` is bounded to keep single responses small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: usize,
    size: usize,
}

impl Page {
    /// Default page number when the caller supplies none.
    pub const DEFAULT_NUMBER: usize = 1;

    /// Default page size when the caller supplies none.
    pub const DEFAULT_SIZE: usize = 10;

    /// Largest accepted page size.
    pub const MAX_SIZE: usize = 100;

    /// Creates a validated page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidNumber`] when `number` is zero and
    /// [`PageError::InvalidSize`] when `size` is zero or exceeds
    /// [`Page::MAX_SIZE`].
    pub const fn new(number: usize, size: usize) -> Result<Self, PageError> {
        if number < 1 {
            return Err(PageError::InvalidNumber(number));
        }
        if size < 1 || size > Self::MAX_SIZE {
            return Err(PageError::InvalidSize(size));
        }
        Ok(Self { number, size })
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn number(self) -> usize {
        self.number
    }

    /// Returns the page size.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    /// Returns the number of items preceding this page.
    ///
    /// Saturates rather than overflowing for absurdly large page numbers;
    /// an offset past the end of a result set selects an empty page.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.number - 1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: Self::DEFAULT_NUMBER,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Read-only pagination summary derived from a list result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The 1-based page number that was requested.
    pub page: usize,
    /// The page size that was requested.
    pub page_size: usize,
    /// Total number of items matching the filter, across all pages.
    pub total_items: usize,
    /// Total number of pages at the requested size.
    pub total_pages: usize,
}

impl PageInfo {
    /// Computes the summary for a page request against a total item count.
    ///
    /// `total_pages` rounds up, so a final partial page counts as a page.
    /// The page size is non-zero by [`Page`] construction.
    #[must_use]
    pub const fn for_page(page: Page, total_items: usize) -> Self {
        Self {
            page: page.number(),
            page_size: page.size(),
            total_items,
            total_pages: total_items.div_ceil(page.size()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageError, PageInfo};

    #[test]
    fn page_rejects_zero_number() {
        assert_eq!(Page::new(0, 10), Err(PageError::InvalidNumber(0)));
    }

    #[test]
    fn page_rejects_zero_size() {
        assert_eq!(Page::new(1, 0), Err(PageError::InvalidSize(0)));
    }

    #[test]
    fn page_rejects_oversized_page() {
        assert_eq!(Page::new(1, 101), Err(PageError::InvalidSize(101)));
    }

    #[test]
    fn page_accepts_bounds() {
        assert!(Page::new(1, 1).is_ok());
        assert!(Page::new(1, Page::MAX_SIZE).is_ok());
    }

    #[test]
    fn offset_is_zero_for_first_page() {
        let page = Page::new(1, 10).expect("valid page");
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_skips_preceding_pages() {
        let page = Page::new(3, 10).expect("valid page");
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn page_info_rounds_total_pages_up() {
        let page = Page::new(3, 10).expect("valid page");
        let info = PageInfo::for_page(page, 25);
        assert_eq!(
            info,
            PageInfo {
                page: 3,
                page_size: 10,
                total_items: 25,
                total_pages: 3,
            }
        );
    }

    #[test]
    fn page_info_for_empty_result_has_zero_pages() {
        let page = Page::default();
        let info = PageInfo::for_page(page, 0);
        assert_eq!(info.total_pages, 0);
        assert_eq!(info.total_items, 0);
    }

    #[test]
    fn page_info_for_exact_multiple_has_no_trailing_page() {
        let page = Page::new(1, 10).expect("valid page");
        assert_eq!(PageInfo::for_page(page, 30).total_pages, 3);
    }
}
