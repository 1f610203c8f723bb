use async_trait::async_trait;

/// A single fixed-size page as returned by the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPage<T> {
    /// 1-indexed upstream page number.
    pub page: u64,
    pub items: Vec<T>,

    /// Total number of results the upstream reports for the whole query.
    pub total_results: u64,
}

impl<T> UpstreamPage<T> {
    #[must_use]
    pub const fn new(page: u64, items: Vec<T>, total_results: u64) -> Self {
        Self {
            page,
            items,
            total_results,
        }
    }
}

/// An upstream that only serves pages of a fixed size.
///
/// Implementations carry whatever query parameters apply (filters,
/// language, credentials), so every page fetched through the same source
/// belongs to the same query.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// The fixed number of items per upstream page.
    fn page_size(&self) -> u32;

    /// Fetch the 1-indexed upstream `page`.
    async fn fetch_page(&self, page: u64) -> Result<UpstreamPage<Self::Item>, Self::Error>;
}

