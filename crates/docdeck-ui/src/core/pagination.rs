//! Page slicing over the backing collection.
//!
//! [`derive`] is a pure function; [`Pagination`] only remembers the requested
//! page and keeps it inside `1..=total_pages` as the collection changes.

use std::num::NonZeroUsize;
use std::ops::Range;

/// Result of slicing a collection into pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// Number of pages; at least 1 even for an empty collection.
    pub total_pages: usize,
    /// Active page after clamping, 1-based.
    pub clamped_page: usize,
    /// First index of the slice (inclusive).
    pub start: usize,
    /// Last index of the slice (exclusive).
    pub end: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl PageWindow {
    /// Index range of the visible rows.
    #[must_use]
    pub const fn slice(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Rows actually visible on the page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the page has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Blank rows needed to keep the table at a full page height.
    #[must_use]
    pub const fn filler_rows(&self, rendered: usize) -> usize {
        self.page_size.saturating_sub(rendered)
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.clamped_page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.clamped_page < self.total_pages
    }
}

/// Number of pages for `collection_size` items, never below 1.
#[must_use]
pub const fn total_pages(collection_size: usize, page_size: NonZeroUsize) -> usize {
    let pages = collection_size.div_ceil(page_size.get());
    if pages == 0 { 1 } else { pages }
}

/// Slice a collection of `collection_size` items for `current_page`.
#[must_use]
pub fn derive(collection_size: usize, page_size: NonZeroUsize, current_page: usize) -> PageWindow {
    let total_pages = total_pages(collection_size, page_size);
    let clamped_page = current_page.clamp(1, total_pages);
    let size = page_size.get();
    let start = (clamped_page - 1).saturating_mul(size).min(collection_size);
    let end = clamped_page.saturating_mul(size).min(collection_size);
    PageWindow {
        total_pages,
        clamped_page,
        start,
        end,
        page_size: size,
    }
}

/// Pagination state owned by a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page_size: NonZeroUsize,
    current_page: usize,
}

impl Pagination {
    /// Start on page 1.
    #[must_use]
    pub const fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            current_page: 1,
        }
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Active page, 1-based.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Window for a collection of `collection_size` items.
    #[must_use]
    pub fn window(&self, collection_size: usize) -> PageWindow {
        derive(collection_size, self.page_size, self.current_page)
    }

    /// Handle an explicit page-change request, bounded to `1..=total_pages`.
    /// Returns the page that became active.
    pub fn set_page(&mut self, requested: usize, collection_size: usize) -> usize {
        let total = total_pages(collection_size, self.page_size);
        self.current_page = requested.clamp(1, total);
        self.current_page
    }

    /// Pull the active page back inside the valid range after the collection
    /// changed. Returns `true` when the page moved.
    pub fn clamp(&mut self, collection_size: usize) -> bool {
        let total = total_pages(collection_size, self.page_size);
        if self.current_page > total {
            self.current_page = total;
            true
        } else {
            false
        }
    }

    /// Step forward one page if possible.
    pub fn next(&mut self, collection_size: usize) -> usize {
        self.set_page(self.current_page.saturating_add(1), collection_size)
    }

    /// Step back one page if possible.
    pub fn previous(&mut self, collection_size: usize) -> usize {
        self.set_page(self.current_page.saturating_sub(1), collection_size)
    }
}
