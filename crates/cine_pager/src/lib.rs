//! Remaps arbitrary client-facing pages onto an upstream that only serves
//! fixed-size pages.
//!
//! A virtual page of `page_size` items at `page_number` is assembled from
//! the smallest contiguous run of upstream pages that covers it:
//!
//! ```text
//! upstream (20/page)  |   1   |   2   |   3   |   4   |   5   |
//! virtual  (42/page)  |      1       ||       2       |
//! ```
//!
//! Virtual page 2 starts at item 42, which is item 2 of upstream page 3,
//! so upstream pages 3, 4 and 5 are fetched and items `2..44` of their
//! concatenation are returned.

mod error;
mod plan;
mod remap;
mod source;

pub use error::{Error, OversizedPage, Result};
pub use plan::{PagePlan, VirtualPageRequest};
pub use remap::{Paged, exclude, get_page};
pub use source::{PageSource, UpstreamPage};

#[cfg(test)]
mod tests;
