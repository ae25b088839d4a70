//! Offset pagination shared by every list-returning operation.

use serde::{Deserialize, Serialize};

/// Upper bound for a single page.
pub const MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-indexed page request. Construction clamps both values into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Resolve this request against the number of matching items.
    pub fn window(&self, total_count: u64) -> PageWindow {
        let size = u64::from(self.page_size);
        let total_pages = total_count.div_ceil(size);
        let page = u64::from(self.page).min(total_pages).max(1);

        PageWindow {
            page: page as u32,
            page_size: self.page_size,
            total_count,
            total_pages,
            offset: (page - 1) * size,
        }
    }
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: u32,
    page_size: u32,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        Self::new(raw.page, raw.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A page request resolved against a known total: the clamped page number
/// and the offset/limit both stores use to slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
    pub offset: u64,
}

impl PageWindow {
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    pub fn into_result<T>(self, items: Vec<T>) -> PaginationResult<T> {
        PaginationResult {
            items,
            page_number: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

/// The uniform paged-result shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> PaginationResult<T> {
    pub fn empty(request: PageRequest) -> Self {
        request.window(0).into_result(Vec::new())
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_number) < self.total_pages
    }

    /// Transform the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResult<U> {
        PaginationResult {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

/// Slice an already filtered and ordered sequence. Never reorders.
pub fn paginate<T: Clone>(ordered: &[T], request: PageRequest) -> PaginationResult<T> {
    let window = request.window(ordered.len() as u64);
    let items = ordered
        .iter()
        .skip(window.offset as usize)
        .take(window.limit() as usize)
        .cloned()
        .collect();
    window.into_result(items)
}
