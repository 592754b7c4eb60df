//! # Table State Module
//!
//! Client-side pagination over an already-filtered list.
//!
//! ## Responsibilities:
//! - Current page index and page size
//! - Clamping the page when the filtered list shrinks
//! - Slicing out the visible rows
//!
//! Pages are zero-based internally and rendered one-based.

/// Pagination position for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableState {
    page: usize,
    page_size: usize,
}

/// What a table shows for one render
#[derive(Debug, PartialEq)]
pub struct PageView<'a, T> {
    pub rows: &'a [T],
    /// Zero-based
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

impl<'a, T> PageView<'a, T> {
    /// "Page 2 of 5" style label
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.total_pages.max(1))
    }

    /// One-based index of the first visible row
    pub fn first_row_number(&self, page_size: usize) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.page * page_size + 1
        }
    }
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }

    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size)
    }

    /// Jump to `page`, clamped to the last page of `total_rows`
    pub fn go_to(&mut self, page: usize, total_rows: usize) {
        self.page = page;
        self.clamp(total_rows);
    }

    pub fn next(&mut self, total_rows: usize) {
        self.go_to(self.page + 1, total_rows);
    }

    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Back to the first page, e.g. when a filter changes
    pub fn reset(&mut self) {
        self.page = 0;
    }

    fn clamp(&mut self, total_rows: usize) {
        let last = self.total_pages(total_rows).saturating_sub(1);
        if self.page > last {
            self.page = last;
        }
    }

    /// Visible slice of `rows`, clamping first if the list has shrunk
    pub fn view<'a, T>(&mut self, rows: &'a [T]) -> PageView<'a, T> {
        self.clamp(rows.len());
        let start = (self.page * self.page_size).min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        PageView {
            rows: &rows[start..end],
            page: self.page,
            total_pages: self.total_pages(rows.len()),
            total_rows: rows.len(),
        }
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(10)
    }
}
