use std::{collections::HashSet, hash::Hash};

use futures::future::join_all;
use tracing::{debug, trace, warn};

use crate::{
    PageSource,
    error::{Error, OversizedPage, Result},
    plan::{PagePlan, VirtualPageRequest},
};

/// One virtual page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_results: u64,
    pub total_pages: u64,
}

impl<T> Paged<T> {
    /// Drop every item whose key is in `excluded`.
    ///
    /// Totals are left untouched and the page is never topped up, so the
    /// result can be shorter than the requested page size.
    #[must_use]
    pub fn exclude<K, F>(self, excluded: &HashSet<K>, key: F) -> Self
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        Self {
            items: exclude(self.items, excluded, key),
            ..self
        }
    }
}

/// Keep only the items whose key is not in `excluded`, preserving order.
pub fn exclude<T, K, F>(items: Vec<T>, excluded: &HashSet<K>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    if excluded.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| !excluded.contains(&key(item)))
        .collect()
}

/// Fetch one virtual page from a fixed-page-size `source`.
///
/// All upstream pages covering the window are requested at once and
/// awaited together; the results are merged in ascending page order
/// regardless of which fetch finishes first. If any fetch fails, the whole
/// request fails with the lowest failing page number attached.
pub async fn get_page<S>(source: &S, request: VirtualPageRequest) -> Result<Paged<S::Item>>
where
    S: PageSource + ?Sized,
{
    let plan = PagePlan::new(request, source.page_size())?;
    debug!(
        page_size = plan.page_size,
        page_number = request.page_number,
        first_upstream_page = plan.first_upstream_page,
        pages_needed = plan.pages_needed,
        "Fetching virtual page."
    );

    let fetches = plan.upstream_pages().map(|page| async move {
        trace!(page, "Fetching upstream page.");
        (page, source.fetch_page(page).await)
    });

    // `join_all` yields results in the order the futures were created,
    // which is ascending page order.
    let responses = join_all(fetches).await;

    let mut total_results = None;
    let mut merged = Vec::new();
    for (page, response) in responses {
        let upstream = response.map_err(|error| {
            warn!(page, %error, "Upstream page fetch failed.");
            Error::upstream(page, error)
        })?;

        if upstream.items.len() > plan.upstream_page_size as usize {
            return Err(Error::upstream(page, OversizedPage {
                page_size: plan.upstream_page_size,
                actual: upstream.items.len(),
            }));
        }

        total_results.get_or_insert(upstream.total_results);
        merged.extend(upstream.items);
    }

    let offset = usize::try_from(plan.offset_in_first).unwrap_or(usize::MAX);
    let items: Vec<_> = merged
        .into_iter()
        .skip(offset)
        .take(plan.page_size as usize)
        .collect();

    let total_results = total_results.unwrap_or_default();
    trace!(
        items = items.len(),
        total_results, "Assembled virtual page."
    );

    Ok(Paged {
        items,
        total_results,
        total_pages: plan.total_pages(total_results),
    })
}
