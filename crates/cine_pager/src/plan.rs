use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// A page as the client sees it: any page size, 1-indexed page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualPageRequest {
    pub page_size: u32,
    pub page_number: u32,
}

impl VirtualPageRequest {
    #[must_use]
    pub const fn new(page_size: u32, page_number: u32) -> Self {
        Self {
            page_size,
            page_number,
        }
    }

    pub fn validate(self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(Error::InvalidRequest {
                field: "page size",
                value: 0,
            });
        }

        if self.page_number == 0 {
            return Err(Error::InvalidRequest {
                field: "page number",
                value: 0,
            });
        }

        Ok(self)
    }
}

/// The contiguous run of upstream pages covering one virtual page, and
/// where inside their concatenation the virtual page sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Zero-based offset of the virtual page within the whole result set.
    pub start_index: u64,

    /// First upstream page to fetch, 1-indexed.
    pub first_upstream_page: u64,

    /// Position of the window's first item inside `first_upstream_page`.
    pub offset_in_first: u64,

    /// Number of consecutive upstream pages to fetch.
    pub pages_needed: u64,

    pub page_size: u32,
    pub upstream_page_size: u32,
}

impl PagePlan {
    pub fn new(request: VirtualPageRequest, upstream_page_size: u32) -> Result<Self> {
        let request = request.validate()?;
        if upstream_page_size == 0 {
            return Err(Error::InvalidRequest {
                field: "upstream page size",
                value: 0,
            });
        }

        let page_size = u64::from(request.page_size);
        let upstream = u64::from(upstream_page_size);

        // Both factors fit in 32 bits, so the product cannot overflow.
        let start_index = u64::from(request.page_number - 1) * page_size;
        let first_upstream_page = start_index / upstream + 1;
        let offset_in_first = start_index % upstream;
        let pages_needed = (offset_in_first + page_size).div_ceil(upstream);

        Ok(Self {
            start_index,
            first_upstream_page,
            offset_in_first,
            pages_needed,
            page_size: request.page_size,
            upstream_page_size,
        })
    }

    /// Upstream page numbers to fetch, in ascending order.
    #[must_use]
    pub const fn upstream_pages(&self) -> RangeInclusive<u64> {
        self.first_upstream_page..=self.last_upstream_page()
    }

    #[must_use]
    pub const fn last_upstream_page(&self) -> u64 {
        self.first_upstream_page + self.pages_needed - 1
    }

    /// Number of virtual pages needed to show `total_results` items.
    #[must_use]
    pub const fn total_pages(&self, total_results: u64) -> u64 {
        total_results.div_ceil(self.page_size as u64)
    }
}
