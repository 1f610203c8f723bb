//! A mock TMDB upstream.

pub use httpmock::{Method::GET, Mock, MockServer};
use serde_json::Value;

use crate::fixtures::results_page;

/// Upstream page size the mock catalogue is served in.
pub const UPSTREAM_PAGE_SIZE: u64 = 20;

/// Register one mock per upstream page of a catalogue of `total` sequential
/// ids (starting at 1) served from `path`.
///
/// Pages beyond the catalogue answer with an empty result list.
pub async fn mount_catalogue<'a>(
    server: &'a MockServer,
    path: &str,
    total: u64,
    pages: std::ops::RangeInclusive<u64>,
) -> Vec<Mock<'a>> {
    let mut mocks = vec![];
    for page in pages {
        let start = (page - 1) * UPSTREAM_PAGE_SIZE + 1;
        let end = (start + UPSTREAM_PAGE_SIZE).min(total + 1);
        let ids: Vec<u64> = (start..end.max(start)).collect();
        let body = results_page(page, &ids, total);

        mocks.push(mount_json(server, path, page, body).await);
    }

    mocks
}

async fn mount_json<'a>(server: &'a MockServer, path: &str, page: u64, body: Value) -> Mock<'a> {
    let page = page.to_string();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("page", page.as_str());
            then.status(200).json_body(body);
        })
        .await
}
