use async_trait::async_trait;
use cine_pager::{PageSource, UpstreamPage};

use crate::{
    Client, Error, PAGE_SIZE,
    models::MediaItem,
    params::{Filters, Listing},
};

/// A listing query bound to its filters, served in TMDB's fixed pages.
#[derive(Debug, Clone)]
pub struct ListingSource {
    client: Client,
    listing: Listing,
    filters: Filters,
}

impl ListingSource {
    #[must_use]
    pub const fn new(client: Client, listing: Listing, filters: Filters) -> Self {
        Self {
            client,
            listing,
            filters,
        }
    }

    #[must_use]
    pub const fn listing(&self) -> Listing {
        self.listing
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }
}

#[async_trait]
impl PageSource for ListingSource {
    type Item = MediaItem;
    type Error = Error;

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    async fn fetch_page(&self, page: u64) -> Result<UpstreamPage<MediaItem>, Error> {
        let response = self
            .client
            .movies()
            .listing(self.listing, &self.filters, page)
            .await?;

        Ok(UpstreamPage::new(
            page,
            response.results,
            response.total_results,
        ))
    }
}
