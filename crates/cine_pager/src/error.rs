pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid page request: {field} must be at least 1, got {value}")]
    InvalidRequest { field: &'static str, value: u64 },

    #[error("upstream page {page} failed: {source}")]
    Upstream {
        page: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn upstream(
        page: u64,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Upstream {
            page,
            source: source.into(),
        }
    }

    /// The upstream page number that triggered the failure, if any.
    #[must_use]
    pub const fn upstream_page(&self) -> Option<u64> {
        match self {
            Self::Upstream { page, .. } => Some(*page),
            Self::InvalidRequest { .. } => None,
        }
    }
}

/// An upstream page carried more items than the source's fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page holds {actual} items, more than the page size of {page_size}")]
pub struct OversizedPage {
    pub page_size: u32,
    pub actual: usize,
}
