use crate::domain::ports::RowRange;

/// Default number of rows on a department page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request, clamping the page to >= 1 and the size to `1..=max_page_size`.
    pub fn new(page: Option<u32>, page_size: Option<u32>, max_page_size: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, max_page_size.max(1)),
        }
    }

    /// Inclusive row window `[(page-1)*size, page*size-1]`.
    pub fn range(&self) -> RowRange {
        let offset = u64::from(self.page - 1) * u64::from(self.page_size);
        RowRange {
            offset,
            limit: u64::from(self.page_size),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
