use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;
use test_log::test;

use crate::{Error, PageSource, Paged, UpstreamPage, VirtualPageRequest, get_page};

#[derive(Debug, thiserror::Error)]
#[error("page {0} is unavailable")]
struct Unavailable(u64);

/// Serves `total` sequential numbers in pages of `page_size`.
struct NumberSource {
    page_size: u32,
    total: u64,
    failing: HashSet<u64>,
    /// Later pages answer sooner, so completion order is the reverse of
    /// request order.
    staggered: bool,
    requested: Mutex<Vec<u64>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl NumberSource {
    fn new(page_size: u32, total: u64) -> Self {
        Self {
            page_size,
            total,
            failing: HashSet::new(),
            staggered: false,
            requested: Mutex::new(vec![]),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn failing(mut self, pages: impl IntoIterator<Item = u64>) -> Self {
        self.failing.extend(pages);
        self
    }

    fn staggered(mut self) -> Self {
        self.staggered = true;
        self
    }

    fn requested(&self) -> Vec<u64> {
        let mut pages = self.requested.lock().clone();
        pages.sort_unstable();
        pages
    }
}

#[async_trait]
impl PageSource for NumberSource {
    type Item = u64;
    type Error = Unavailable;

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn fetch_page(&self, page: u64) -> Result<UpstreamPage<u64>, Unavailable> {
        self.requested.lock().push(page);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if self.staggered {
            let delay = 50_u64.saturating_sub(page * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&page) {
            return Err(Unavailable(page));
        }

        let size = u64::from(self.page_size);
        let start = (page - 1) * size;
        let end = (start + size).min(self.total);
        let items = (start..end).collect();

        Ok(UpstreamPage::new(page, items, self.total))
    }
}

#[test(tokio::test)]
async fn first_page_of_42_over_pages_of_20() {
    let source = NumberSource::new(20, 1_000);
    let page = get_page(&source, VirtualPageRequest::new(42, 1))
        .await
        .unwrap();

    assert_eq!(source.requested(), vec![1, 2, 3]);
    assert_eq!(page.items, (0..42).collect::<Vec<_>>());
    assert_eq!(page.total_results, 1_000);
    assert_eq!(page.total_pages, 24);
}

#[test(tokio::test)]
async fn second_page_of_42_over_pages_of_20() {
    let source = NumberSource::new(20, 1_000);
    let page = get_page(&source, VirtualPageRequest::new(42, 2))
        .await
        .unwrap();

    assert_eq!(source.requested(), vec![3, 4, 5]);
    assert_eq!(page.items, (42..84).collect::<Vec<_>>());
}

#[test(tokio::test)]
async fn total_pages_follow_virtual_page_size() {
    let source = NumberSource::new(20, 50);
    let page = get_page(&source, VirtualPageRequest::new(42, 1))
        .await
        .unwrap();

    assert_eq!(page.total_results, 50);
    assert_eq!(page.total_pages, 2);
}

#[test(tokio::test)]
async fn completion_order_does_not_leak_into_output() {
    let source = NumberSource::new(20, 1_000).staggered();
    let page = get_page(&source, VirtualPageRequest::new(42, 2))
        .await
        .unwrap();

    assert_eq!(page.items, (42..84).collect::<Vec<_>>());
}

#[test(tokio::test)]
async fn fetches_are_issued_before_any_completes() {
    let source = NumberSource::new(20, 1_000).staggered();
    let page = get_page(&source, VirtualPageRequest::new(60, 1))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 60);
    assert_eq!(source.requested(), vec![1, 2, 3]);
    assert_eq!(source.peak_in_flight.load(Ordering::SeqCst), 3);
}

#[test(tokio::test)]
async fn exhausted_upstream_truncates_the_window() {
    let source = NumberSource::new(20, 50);
    let page = get_page(&source, VirtualPageRequest::new(42, 2))
        .await
        .unwrap();

    // Window starts at 42, only 8 items remain.
    assert_eq!(page.items, (42..50).collect::<Vec<_>>());
    assert_eq!(page.total_pages, 2);
}

#[test(tokio::test)]
async fn page_past_the_end_is_empty_not_an_error() {
    let source = NumberSource::new(20, 50);
    let page = get_page(&source, VirtualPageRequest::new(42, 5))
        .await
        .unwrap();

    assert_eq!(page, Paged {
        items: vec![],
        total_results: 50,
        total_pages: 2,
    });
}

#[test(tokio::test)]
async fn any_failed_fetch_fails_the_whole_page() {
    let source = NumberSource::new(20, 1_000).failing([4]);
    let error = get_page(&source, VirtualPageRequest::new(42, 2))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Upstream { page: 4, .. });
    assert_eq!(error.upstream_page(), Some(4));
    assert_eq!(source.requested(), vec![3, 4, 5]);
}

#[test(tokio::test)]
async fn lowest_failing_page_is_reported() {
    let source = NumberSource::new(20, 1_000).failing([5, 3]).staggered();
    let error = get_page(&source, VirtualPageRequest::new(42, 2))
        .await
        .unwrap_err();

    assert_eq!(error.upstream_page(), Some(3));
    assert_eq!(error.to_string(), "upstream page 3 failed: page 3 is unavailable");
}

#[test(tokio::test)]
async fn invalid_requests_fail_before_fetching() {
    let source = NumberSource::new(20, 1_000);

    let error = get_page(&source, VirtualPageRequest::new(0, 1))
        .await
        .unwrap_err();
    assert_matches!(error, Error::InvalidRequest { field: "page size", .. });

    let error = get_page(&source, VirtualPageRequest::new(42, 0))
        .await
        .unwrap_err();
    assert_matches!(error, Error::InvalidRequest { field: "page number", .. });

    assert!(source.requested().is_empty());
}

#[test(tokio::test)]
async fn oversized_upstream_page_is_an_upstream_failure() {
    struct Liar;

    #[async_trait]
    impl PageSource for Liar {
        type Item = u8;
        type Error = Unavailable;

        fn page_size(&self) -> u32 {
            2
        }

        async fn fetch_page(&self, page: u64) -> Result<UpstreamPage<u8>, Unavailable> {
            Ok(UpstreamPage::new(page, vec![1, 2, 3], 3))
        }
    }

    let error = get_page(&Liar, VirtualPageRequest::new(2, 1))
        .await
        .unwrap_err();

    assert_matches!(error, Error::Upstream { page: 1, .. });
}

#[test(tokio::test)]
async fn repeated_requests_are_identical() {
    let source = NumberSource::new(20, 333);
    let request = VirtualPageRequest::new(17, 6);

    let first = get_page(&source, request).await.unwrap();
    let second = get_page(&source, request).await.unwrap();

    assert_eq!(first, second);
}

#[test(tokio::test)]
async fn exclusion_only_shrinks_the_window() {
    let source = NumberSource::new(20, 1_000);
    let excluded: HashSet<u64> = [0, 5, 41, 42].into();

    let page = get_page(&source, VirtualPageRequest::new(42, 1))
        .await
        .unwrap()
        .exclude(&excluded, |item| *item);

    assert_eq!(page.items.len(), 39);
    assert!(page.items.iter().all(|item| !excluded.contains(item)));
    assert_eq!(page.items.last(), Some(&40));
    assert_eq!(page.total_results, 1_000);
    assert_eq!(page.total_pages, 24);
    assert_eq!(source.requested(), vec![1, 2, 3]);
}
